use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table},
};

use crate::{
    header_row,
    model::{analysis::DashboardData, choice::Choice, user::Tier},
    service::metrics::{filter_rankers, summarize_tiers, DashboardSummary},
    styled_line, styled_span,
    ui::{
        async_data::AsyncData,
        route::Route,
        views::{
            eval_color_scale_descending, format_thousands, render_data, tier_color, win_rate_scale, RenderableView,
        },
        Controller, RenderContext,
    },
};

pub struct DashboardView {
    data: AsyncData<DashboardData>,
}

impl DashboardView {
    pub fn new(controller: &Controller) -> Self {
        let mut view = Self { data: AsyncData::new() };
        view.refresh_data(controller);
        view
    }

    fn summary_lines(summary: &DashboardSummary) -> Vec<Line<'static>> {
        let avg_level = summary
            .avg_level
            .map_or_else(|| "-".to_string(), |avg| format!("{:.1}", avg));

        vec![
            styled_line!(LIST [
                styled_span!("Total players:   "; Color::DarkGray),
                styled_span!(format_thousands(summary.total_users); Bold Color::White),
            ]),
            styled_line!(LIST [
                styled_span!("Average level:   "; Color::DarkGray),
                styled_span!(avg_level; Bold Color::White),
            ]),
            styled_line!(LIST [
                styled_span!("Grandmasters:    "; Color::DarkGray),
                styled_span!(format_thousands(summary.top_tier_users); Bold tier_color(Tier::Grandmaster)),
            ]),
        ]
    }

    fn render_dashboard(&self, data: &DashboardData, rc: RenderContext) {
        let inner = rc.block.inner(rc.area);
        rc.frame.render_widget(rc.block, rc.area);

        let summary = summarize_tiers(&data.tier_stats);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(summary.slices.len().max(1) as u16 + 2),
                Constraint::Min(0),
            ])
            .split(inner);

        rc.frame
            .render_widget(Paragraph::new(Self::summary_lines(&summary)), chunks[0]);

        let chart_block = Block::default()
            .borders(Borders::TOP)
            .title("Players per Tier")
            .title_style(Style::default().add_modifier(Modifier::BOLD));
        if summary.slices.is_empty() {
            let paragraph =
                Paragraph::new(styled_line!("No tier statistics reported."; Color::DarkGray)).block(chart_block);
            rc.frame.render_widget(paragraph, chunks[1]);
        } else {
            let bars: Vec<Bar> = summary
                .slices
                .iter()
                .map(|slice| {
                    Bar::default()
                        .value(slice.count)
                        .label(Line::from(format!("{:<11}", slice.tier.code())))
                        .text_value(format!("{} ({:.1}%)", format_thousands(slice.count), slice.share * 100.0))
                        .style(Style::default().fg(tier_color(slice.tier)))
                        .value_style(Style::default().fg(Color::Black).bg(tier_color(slice.tier)))
                })
                .collect();
            let chart = BarChart::default()
                .block(chart_block)
                .direction(Direction::Horizontal)
                .bar_width(1)
                .bar_gap(0)
                .data(BarGroup::default().bars(&bars));
            rc.frame.render_widget(chart, chunks[1]);
        }

        let table_block = Block::default()
            .borders(Borders::TOP)
            .title("Top Rankers")
            .title_style(Style::default().add_modifier(Modifier::BOLD));
        if data.top_rankers.is_empty() {
            let paragraph = Paragraph::new(styled_line!("No ranked players yet."; Color::DarkGray)).block(table_block);
            rc.frame.render_widget(paragraph, chunks[2]);
            return;
        }

        let rows: Vec<Row> = filter_rankers(&data.top_rankers, None)
            .into_iter()
            .skip(rc.scroll_offset as usize)
            .map(|(rank, user)| {
                Row::new(vec![
                    Cell::from(styled_line!(rank).alignment(Alignment::Right)),
                    Cell::from(user.nickname.clone()),
                    Cell::from(styled_line!(user.tier.code(); tier_color(user.tier))),
                    Cell::from(styled_line!(user.level).alignment(Alignment::Right)),
                    Cell::from(styled_line!(format_thousands(user.ranking_score)).alignment(Alignment::Right)),
                    Cell::from(
                        styled_line!(
                            "{:.1}%", user.win_rate;
                            eval_color_scale_descending(user.win_rate, &win_rate_scale())
                        )
                        .alignment(Alignment::Right),
                    ),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(4),
                Constraint::Min(16),
                Constraint::Length(12),
                Constraint::Length(5),
                Constraint::Length(10),
                Constraint::Length(8),
            ],
        )
        .header(
            header_row!("#", "Player", "Tier", "Lvl", "Score", "Win %")
                .style(Style::default().fg(Color::LightBlue).add_modifier(Modifier::BOLD))
                .bottom_margin(1),
        )
        .block(table_block)
        .column_spacing(2);

        rc.frame.render_widget(table, chunks[2]);
    }
}

impl RenderableView for DashboardView {
    fn title(&self) -> &str {
        "Dashboard"
    }

    fn update(&mut self, _controller: &Controller, _keys: &[crossterm::event::KeyCode]) {
        self.data.try_update();
    }

    fn refresh_data(&mut self, controller: &Controller) {
        let manager = controller.manager.clone();
        self.data.request(move || manager.load_dashboard());
    }

    fn is_loading(&self) -> bool {
        self.data.is_loading()
    }

    fn route(&self) -> Option<Route> {
        Some(Route::Dashboard)
    }

    fn render(&self, rc: RenderContext) {
        render_data(&self.data, rc, |data, rc| self.render_dashboard(data, rc));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::user::TierStats,
        service::statsapi::fake::{tier_summary, FakeStatsApi},
        ui::views::testing::{manager, render_lines, screen_contains, settle},
    };

    #[test]
    fn shows_totals_chart_and_rankers() {
        let manager = manager(FakeStatsApi::populated());
        let ctrl = Controller { manager: &manager };
        let mut view = DashboardView::new(&ctrl);
        settle(&mut view, &ctrl);

        let screen = render_lines(&view, 90, 30);

        assert!(screen_contains(&screen, "Total players:   16"));
        assert!(screen_contains(&screen, "Grandmasters:    1"));
        assert!(screen_contains(&screen, "BRONZE"));
        assert!(screen_contains(&screen, "Alpha"));
        assert!(screen_contains(&screen, "9,000"));
    }

    #[test]
    fn empty_server_shows_dash_for_average() {
        let manager = manager(FakeStatsApi::new());
        let ctrl = Controller { manager: &manager };
        let mut view = DashboardView::new(&ctrl);
        settle(&mut view, &ctrl);

        let screen = render_lines(&view, 90, 30);

        assert!(screen_contains(&screen, "Average level:   -"));
        assert!(screen_contains(&screen, "No tier statistics reported."));
        assert!(screen_contains(&screen, "No ranked players yet."));
    }

    #[test]
    fn failed_load_shows_error() {
        let manager = manager(FakeStatsApi::populated().failing("tier_stats"));
        let ctrl = Controller { manager: &manager };
        let mut view = DashboardView::new(&ctrl);
        settle(&mut view, &ctrl);

        let screen = render_lines(&view, 90, 20);

        assert!(screen_contains(&screen, "[!] Error: Server returned error 500"));
        assert!(!screen_contains(&screen, "Total players"));
    }

    #[test]
    fn weighted_average_reaches_screen() {
        let mut api = FakeStatsApi::new();
        api.tier_stats = TierStats::new(vec![(Tier::Bronze, tier_summary(10, 5.0)), (Tier::Gold, tier_summary(5, 20.0))]);
        let manager = manager(api);
        let ctrl = Controller { manager: &manager };
        let mut view = DashboardView::new(&ctrl);
        settle(&mut view, &ctrl);

        let screen = render_lines(&view, 90, 20);

        assert!(screen_contains(&screen, "Total players:   15"));
        assert!(screen_contains(&screen, "Average level:   10.0"));
    }
}
