use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Cell, Paragraph, Row, Table},
};

use crate::{
    header_row,
    model::{analysis::SkillAnalysis, choice::Choice, filter::SkillFilter},
    service::metrics::{top_preferred, type_distribution, usage_series},
    styled_line, styled_span,
    ui::{
        async_data::AsyncData,
        route::Route,
        views::{
            format_thousands, render_data, skill_type_color, split_filter_area,
            usage::{apply_filter_keys, render_top_panel, render_usage_chart, usage_filter_line, USAGE_HINTS},
            RenderableView,
        },
        Controller, RenderContext,
    },
};

pub struct SkillAnalysisView {
    filter: SkillFilter,
    data: AsyncData<SkillAnalysis>,
}

impl SkillAnalysisView {
    pub fn new(controller: &Controller) -> Self {
        let mut view = Self {
            filter: SkillFilter::default(),
            data: AsyncData::new(),
        };
        view.refresh_data(controller);
        view
    }

    fn render_analysis(&self, analysis: &SkillAnalysis, rc: RenderContext) {
        let inner = rc.block.inner(rc.area);
        rc.frame.render_widget(rc.block, rc.area);

        let (filter_area, content) = split_filter_area(inner);
        rc.frame
            .render_widget(Paragraph::new(usage_filter_line(&self.filter)), filter_area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Length(2), Constraint::Min(0)])
            .split(content);
        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Min(0)])
            .split(rows[0]);

        render_usage_chart(
            rc.frame,
            top[0],
            "Popular Skills",
            &usage_series(&analysis.popular),
            Color::LightCyan,
        );

        let preferred: Vec<_> = top_preferred(&analysis.top_players.skills)
            .iter()
            .map(|skill| (skill.name.clone(), skill.total_usage.unwrap_or(0)))
            .collect();
        render_top_panel(
            rc.frame,
            top[1],
            analysis.top_players.top_percent,
            analysis.top_players.top_user_count,
            &preferred,
        );

        let mut distribution: Vec<Span> = vec![styled_span!("By type: "; Color::DarkGray)];
        for (skill_type, count) in type_distribution(&analysis.popular) {
            distribution.push(styled_span!("{} ", skill_type.code(); skill_type_color(skill_type)));
            distribution.push(styled_span!("{}   ", count));
        }
        rc.frame.render_widget(Paragraph::new(styled_line!(VAR distribution)), rows[1]);

        if analysis.popular.is_empty() {
            return;
        }

        let table_rows: Vec<Row> = analysis
            .popular
            .iter()
            .enumerate()
            .skip(rc.scroll_offset as usize)
            .map(|(i, skill)| {
                let cooldown = if skill.has_cooldown() {
                    styled_line!("{}s", skill.cooldown)
                } else {
                    styled_line!("-"; Color::DarkGray)
                };
                Row::new(vec![
                    Cell::from(styled_line!(i + 1).alignment(Alignment::Right)),
                    Cell::from(skill.name.clone()),
                    Cell::from(styled_line!(skill.skill_type.code(); skill_type_color(skill.skill_type))),
                    Cell::from(cooldown.alignment(Alignment::Right)),
                    Cell::from(
                        styled_line!(format_thousands(skill.total_usage.unwrap_or(0))).alignment(Alignment::Right),
                    ),
                ])
            })
            .collect();

        let table = Table::new(
            table_rows,
            [
                Constraint::Length(4),
                Constraint::Min(20),
                Constraint::Length(10),
                Constraint::Length(9),
                Constraint::Length(10),
            ],
        )
        .header(
            header_row!("#", "Skill", "Type", "Cooldown", "Usage")
                .style(Style::default().fg(Color::LightBlue).add_modifier(Modifier::BOLD))
                .bottom_margin(1),
        )
        .column_spacing(2);

        rc.frame.render_widget(table, rows[2]);
    }
}

impl RenderableView for SkillAnalysisView {
    fn title(&self) -> &str {
        "Skill Analysis"
    }

    fn update(&mut self, controller: &Controller, keys: &[KeyCode]) {
        if apply_filter_keys(&mut self.filter, keys) {
            self.refresh_data(controller);
        }
        self.data.try_update();
    }

    fn refresh_data(&mut self, controller: &Controller) {
        let manager = controller.manager.clone();
        let filter = self.filter;
        self.data.request(move || manager.load_skill_analysis(&filter));
    }

    fn is_loading(&self) -> bool {
        self.data.is_loading()
    }

    fn hints(&self) -> &str {
        USAGE_HINTS
    }

    fn route(&self) -> Option<Route> {
        Some(Route::Skills)
    }

    fn render(&self, rc: RenderContext) {
        render_data(&self.data, rc, |analysis, rc| self.render_analysis(analysis, rc));
    }
}
