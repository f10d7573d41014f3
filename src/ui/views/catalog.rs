use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint},
    style::{Color, Modifier, Style},
    widgets::{Cell, Paragraph, Row, Table},
};

use crate::{
    header_row,
    model::{choice::Choice, item::Item, skill::Skill, user::UserPage},
    styled_line,
    ui::{
        async_data::AsyncData,
        views::{
            eval_color_scale_descending, filter_line, format_thousands, item_type_color, render_data,
            skill_type_color, split_filter_area, tier_color, win_rate_scale, RenderableView,
        },
        Controller, RenderContext,
    },
};

fn header_style() -> Style {
    Style::default().fg(Color::LightBlue).add_modifier(Modifier::BOLD)
}

// ============================================================================
// Player Directory
// ============================================================================

pub struct PlayerDirectoryView {
    page: u32,
    data: AsyncData<UserPage>,
}

impl PlayerDirectoryView {
    pub fn new(controller: &Controller) -> Self {
        let mut view = Self {
            page: 1,
            data: AsyncData::new(),
        };
        view.refresh_data(controller);
        view
    }

    fn render_page(&self, page: &UserPage, rc: RenderContext) {
        let inner = rc.block.inner(rc.area);
        rc.frame.render_widget(rc.block, rc.area);

        let (filter_area, content) = split_filter_area(inner);
        let status = filter_line(&[
            ("Page", self.page.to_string()),
            ("Players", format_thousands(page.count)),
        ]);
        rc.frame.render_widget(Paragraph::new(status), filter_area);

        if page.results.is_empty() {
            rc.frame
                .render_widget(Paragraph::new(styled_line!("No players on this page."; Color::DarkGray)), content);
            return;
        }

        let rows: Vec<Row> = page
            .results
            .iter()
            .skip(rc.scroll_offset as usize)
            .map(|user| {
                Row::new(vec![
                    Cell::from(styled_line!(user.id).alignment(Alignment::Right)),
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
                    Cell::from(
                        user.created_at
                            .map(|at| at.format("%Y-%m-%d").to_string())
                            .unwrap_or_default(),
                    ),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(6),
                Constraint::Min(16),
                Constraint::Length(12),
                Constraint::Length(5),
                Constraint::Length(10),
                Constraint::Length(8),
                Constraint::Length(10),
            ],
        )
        .header(
            header_row!("ID", "Player", "Tier", "Lvl", "Score", "Win %", "Joined")
                .style(header_style())
                .bottom_margin(1),
        )
        .column_spacing(2);

        rc.frame.render_widget(table, content);
    }
}

impl RenderableView for PlayerDirectoryView {
    fn title(&self) -> &str {
        "Player Directory"
    }

    fn update(&mut self, controller: &Controller, keys: &[KeyCode]) {
        self.data.try_update();

        let (has_next, has_previous) = self
            .data
            .get_data()
            .map_or((false, false), |p| (p.next.is_some(), p.previous.is_some()));
        let page = self.page;
        for key in keys {
            match key {
                KeyCode::Char('n') if has_next => self.page = page + 1,
                KeyCode::Char('p') if has_previous && page > 1 => self.page = page - 1,
                _ => {}
            }
        }
        if self.page != page {
            self.refresh_data(controller);
        }
    }

    fn refresh_data(&mut self, controller: &Controller) {
        let manager = controller.manager.clone();
        let page = self.page;
        self.data.request(move || manager.load_users(page));
    }

    fn is_loading(&self) -> bool {
        self.data.is_loading()
    }

    fn hints(&self) -> &str {
        "n/p page"
    }

    fn render(&self, rc: RenderContext) {
        render_data(&self.data, rc, |page, rc| self.render_page(page, rc));
    }
}

// ============================================================================
// Item Catalog
// ============================================================================

pub struct ItemCatalogView {
    data: AsyncData<Vec<Item>>,
}

impl ItemCatalogView {
    pub fn new(controller: &Controller) -> Self {
        let mut view = Self { data: AsyncData::new() };
        view.refresh_data(controller);
        view
    }

    fn render_items(items: &[Item], rc: RenderContext) {
        if items.is_empty() {
            rc.placeholder("The item catalog is empty.");
            return;
        }

        let rows: Vec<Row> = items
            .iter()
            .skip(rc.scroll_offset as usize)
            .map(|item| {
                Row::new(vec![
                    Cell::from(item.name.clone()),
                    Cell::from(styled_line!(item.item_type.code(); item_type_color(item.item_type))),
                    Cell::from(styled_line!(format_thousands(item.price)).alignment(Alignment::Right)),
                    Cell::from(styled_line!(item.description.clone(); Color::DarkGray)),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(22),
                Constraint::Length(12),
                Constraint::Length(8),
                Constraint::Min(20),
            ],
        )
        .header(
            header_row!("Item", "Type", "Price", "Description")
                .style(header_style())
                .bottom_margin(1),
        )
        .block(rc.block)
        .column_spacing(2);

        rc.frame.render_widget(table, rc.area);
    }
}

impl RenderableView for ItemCatalogView {
    fn title(&self) -> &str {
        "Item Catalog"
    }

    fn update(&mut self, _controller: &Controller, _keys: &[KeyCode]) {
        self.data.try_update();
    }

    fn refresh_data(&mut self, controller: &Controller) {
        let manager = controller.manager.clone();
        self.data.request(move || manager.load_items());
    }

    fn is_loading(&self) -> bool {
        self.data.is_loading()
    }

    fn render(&self, rc: RenderContext) {
        render_data(&self.data, rc, |items, rc| Self::render_items(items, rc));
    }
}

// ============================================================================
// Skill Catalog
// ============================================================================

pub struct SkillCatalogView {
    data: AsyncData<Vec<Skill>>,
}

impl SkillCatalogView {
    pub fn new(controller: &Controller) -> Self {
        let mut view = Self { data: AsyncData::new() };
        view.refresh_data(controller);
        view
    }

    fn render_skills(skills: &[Skill], rc: RenderContext) {
        if skills.is_empty() {
            rc.placeholder("The skill catalog is empty.");
            return;
        }

        let rows: Vec<Row> = skills
            .iter()
            .skip(rc.scroll_offset as usize)
            .map(|skill| {
                let cooldown = match skill.has_cooldown() {
                    true => styled_line!("{}s", skill.cooldown),
                    false => styled_line!("-"; Color::DarkGray),
                };
                Row::new(vec![
                    Cell::from(skill.name.clone()),
                    Cell::from(styled_line!(skill.skill_type.code(); skill_type_color(skill.skill_type))),
                    Cell::from(cooldown.alignment(Alignment::Right)),
                    Cell::from(styled_line!(skill.description.clone(); Color::DarkGray)),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(22),
                Constraint::Length(10),
                Constraint::Length(9),
                Constraint::Min(20),
            ],
        )
        .header(
            header_row!("Skill", "Type", "Cooldown", "Description")
                .style(header_style())
                .bottom_margin(1),
        )
        .block(rc.block)
        .column_spacing(2);

        rc.frame.render_widget(table, rc.area);
    }
}

impl RenderableView for SkillCatalogView {
    fn title(&self) -> &str {
        "Skill Catalog"
    }

    fn update(&mut self, _controller: &Controller, _keys: &[KeyCode]) {
        self.data.try_update();
    }

    fn refresh_data(&mut self, controller: &Controller) {
        let manager = controller.manager.clone();
        self.data.request(move || manager.load_skills());
    }

    fn is_loading(&self) -> bool {
        self.data.is_loading()
    }

    fn render(&self, rc: RenderContext) {
        render_data(&self.data, rc, |skills, rc| Self::render_skills(skills, rc));
    }
}
