use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Cell, Paragraph, Row, Table},
};

use crate::{
    header_row,
    model::{analysis::ItemAnalysis, choice::Choice, filter::ItemFilter},
    service::metrics::{top_preferred, usage_series},
    styled_line,
    ui::{
        async_data::AsyncData,
        route::Route,
        views::{
            format_thousands, item_type_color, render_data, split_filter_area,
            usage::{apply_filter_keys, render_top_panel, render_usage_chart, usage_filter_line, USAGE_HINTS},
            RenderableView,
        },
        Controller, RenderContext,
    },
};

pub struct ItemAnalysisView {
    filter: ItemFilter,
    data: AsyncData<ItemAnalysis>,
}

impl ItemAnalysisView {
    pub fn new(controller: &Controller) -> Self {
        let mut view = Self {
            filter: ItemFilter::default(),
            data: AsyncData::new(),
        };
        view.refresh_data(controller);
        view
    }

    fn render_analysis(&self, analysis: &ItemAnalysis, rc: RenderContext) {
        let inner = rc.block.inner(rc.area);
        rc.frame.render_widget(rc.block, rc.area);

        let (filter_area, content) = split_filter_area(inner);
        rc.frame
            .render_widget(Paragraph::new(usage_filter_line(&self.filter)), filter_area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Min(0)])
            .split(content);
        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Min(0)])
            .split(rows[0]);

        render_usage_chart(
            rc.frame,
            top[0],
            "Popular Items",
            &usage_series(&analysis.popular),
            Color::Rgb(200, 150, 0),
        );

        let preferred: Vec<_> = top_preferred(&analysis.top_players.items)
            .iter()
            .map(|item| (item.name.clone(), item.total_usage.unwrap_or(0)))
            .collect();
        render_top_panel(
            rc.frame,
            top[1],
            analysis.top_players.top_percent,
            analysis.top_players.top_user_count,
            &preferred,
        );

        if analysis.popular.is_empty() {
            return;
        }

        let table_rows: Vec<Row> = analysis
            .popular
            .iter()
            .enumerate()
            .skip(rc.scroll_offset as usize)
            .map(|(i, item)| {
                Row::new(vec![
                    Cell::from(styled_line!(i + 1).alignment(Alignment::Right)),
                    Cell::from(item.name.clone()),
                    Cell::from(styled_line!(item.item_type.code(); item_type_color(item.item_type))),
                    Cell::from(styled_line!(format_thousands(item.price)).alignment(Alignment::Right)),
                    Cell::from(
                        styled_line!(format_thousands(item.total_usage.unwrap_or(0))).alignment(Alignment::Right),
                    ),
                ])
            })
            .collect();

        let table = Table::new(
            table_rows,
            [
                Constraint::Length(4),
                Constraint::Min(20),
                Constraint::Length(12),
                Constraint::Length(10),
                Constraint::Length(10),
            ],
        )
        .header(
            header_row!("#", "Item", "Type", "Price", "Usage")
                .style(Style::default().fg(Color::LightBlue).add_modifier(Modifier::BOLD))
                .bottom_margin(1),
        )
        .column_spacing(2);

        rc.frame.render_widget(table, rows[1]);
    }
}

impl RenderableView for ItemAnalysisView {
    fn title(&self) -> &str {
        "Item Analysis"
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
        self.data.request(move || manager.load_item_analysis(&filter));
    }

    fn is_loading(&self) -> bool {
        self.data.is_loading()
    }

    fn hints(&self) -> &str {
        USAGE_HINTS
    }

    fn route(&self) -> Option<Route> {
        Some(Route::Items)
    }

    fn render(&self, rc: RenderContext) {
        render_data(&self.data, rc, |analysis, rc| self.render_analysis(analysis, rc));
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::Arc,
        thread,
        time::{Duration, Instant},
    };

    use super::*;
    use crate::{
        model::item::ItemType,
        service::{data_manager::DataManager, statsapi::fake::FakeStatsApi},
        ui::{
            async_data::wait_until,
            views::testing::{manager, render_lines, screen_contains, settle},
        },
    };

    #[test]
    fn shows_popular_items_and_top_six() {
        let manager = manager(FakeStatsApi::populated());
        let ctrl = Controller { manager: &manager };
        let mut view = ItemAnalysisView::new(&ctrl);
        settle(&mut view, &ctrl);

        let screen = render_lines(&view, 100, 40);

        assert!(screen_contains(&screen, "Flame Sword"));
        assert!(screen_contains(&screen, "Top 10% (1 players)"));
        assert!(screen_contains(&screen, "Relic 6"));
        assert!(!screen_contains(&screen, "Relic 7"));
    }

    #[test]
    fn type_key_refetches_with_new_filter() {
        let manager = manager(FakeStatsApi::populated());
        let ctrl = Controller { manager: &manager };
        let mut view = ItemAnalysisView::new(&ctrl);
        settle(&mut view, &ctrl);

        view.update(&ctrl, &[KeyCode::Char('y')]);
        settle(&mut view, &ctrl);

        assert_eq!(view.filter.kind, Some(ItemType::Weapon));
        let popular = &view.data.get_data().unwrap().popular;
        assert_eq!(popular.len(), 1);
        assert!(screen_contains(&render_lines(&view, 100, 40), "Type: WEAPON"));
    }

    #[test]
    fn failure_renders_error_not_empty_state() {
        let failing = manager(FakeStatsApi::populated().failing("popular_items"));
        let ctrl = Controller { manager: &failing };
        let mut view = ItemAnalysisView::new(&ctrl);
        settle(&mut view, &ctrl);
        let screen = render_lines(&view, 100, 30);
        assert!(screen_contains(&screen, "[!] Error"));
        assert!(!screen_contains(&screen, "No usage recorded"));

        let empty = manager(FakeStatsApi::new());
        let ctrl = Controller { manager: &empty };
        let mut view = ItemAnalysisView::new(&ctrl);
        settle(&mut view, &ctrl);
        let screen = render_lines(&view, 100, 30);
        assert!(screen_contains(&screen, "No usage recorded"));
        assert!(!screen_contains(&screen, "[!] Error"));
    }

    #[test]
    fn late_answer_to_older_filter_is_dropped() {
        let (api, release_weapons) = FakeStatsApi::populated().hold_call("popular_items", 1);
        let api = Arc::new(api);
        let manager = DataManager::new(api.clone());
        let ctrl = Controller { manager: &manager };
        let mut view = ItemAnalysisView::new(&ctrl);
        settle(&mut view, &ctrl);

        view.update(&ctrl, &[KeyCode::Char('y')]);
        let deadline = Instant::now() + Duration::from_secs(5);
        while api.calls().iter().filter(|c| c.starts_with("popular_items")).count() < 2 {
            assert!(Instant::now() < deadline, "weapon request never reached the api");
            thread::sleep(Duration::from_millis(5));
        }
        view.update(&ctrl, &[KeyCode::Char('y')]);
        settle(&mut view, &ctrl);

        assert_eq!(view.filter.kind, Some(ItemType::Armor));
        let names: Vec<_> = view.data.get_data().unwrap().popular.iter().map(|i| i.name.clone()).collect();
        assert_eq!(names, vec!["Iron Plate".to_string()]);

        release_weapons.send(()).unwrap();
        wait_until(&mut view.data, |d| d.discarded() == 1);

        let names: Vec<_> = view.data.get_data().unwrap().popular.iter().map(|i| i.name.clone()).collect();
        assert_eq!(names, vec!["Iron Plate".to_string()]);
        let screen = render_lines(&view, 100, 40);
        assert!(screen_contains(&screen, "Type: ARMOR"));
        assert!(screen_contains(&screen, "Iron Plate"));
        assert!(!screen_contains(&screen, "Flame Sword"));
    }
}
