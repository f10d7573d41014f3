use crossterm::event::KeyCode;
use itertools::Itertools;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Cell, Paragraph, Row, Table, Wrap},
};

use crate::{
    header_row,
    model::{
        choice::{filter_label, Choice},
        filter::RankingFilter,
        user::{User, UserDetail},
    },
    service::metrics::filter_rankers,
    styled_line, styled_span,
    ui::{
        async_data::AsyncData,
        route::Route,
        views::{
            eval_color_scale_descending, filter_line, format_thousands, render_data, scroll_window, split_filter_area,
            tier_color, win_rate_scale, RenderableView,
        },
        Controller, RenderContext,
    },
};

/// Usages listed per category in the detail pane
const DETAIL_USAGES: usize = 5;

pub struct RankingView {
    filter: RankingFilter,
    data: AsyncData<Vec<User>>,
    cursor: usize,
    show_detail: bool,
    detail: AsyncData<UserDetail>,
}

impl RankingView {
    pub fn new(controller: &Controller) -> Self {
        let mut view = Self {
            filter: RankingFilter::default(),
            data: AsyncData::new(),
            cursor: 0,
            show_detail: false,
            detail: AsyncData::new(),
        };
        view.refresh_data(controller);
        view
    }

    fn visible_rankers(&self) -> Vec<(usize, &User)> {
        self.data
            .get_data()
            .map(|users| filter_rankers(users, self.filter.tier))
            .unwrap_or_default()
    }

    fn selected(&self) -> Option<&User> {
        self.visible_rankers().get(self.cursor).map(|(_, user)| *user)
    }

    fn request_detail(&mut self, controller: &Controller) {
        if let Some(id) = self.selected().map(|u| u.id) {
            let manager = controller.manager.clone();
            self.detail.request(move || manager.load_user_detail(id));
        }
    }

    fn move_cursor(&mut self, controller: &Controller, down: bool) {
        let len = self.visible_rankers().len();
        let previous = self.cursor;
        self.cursor = match down {
            true => (self.cursor + 1).min(len.saturating_sub(1)),
            false => self.cursor.saturating_sub(1),
        };
        if self.show_detail && self.cursor != previous {
            self.request_detail(controller);
        }
    }

    fn render_rankers(&self, users: &[User], rc: RenderContext) {
        let inner = rc.block.inner(rc.area);
        rc.frame.render_widget(rc.block, rc.area);

        let (filter_area, content) = split_filter_area(inner);
        let filters = filter_line(&[
            ("Tier", filter_label(self.filter.tier).to_string()),
            ("Limit", self.filter.limit.to_string()),
        ]);
        rc.frame.render_widget(Paragraph::new(filters), filter_area);

        let (table_area, detail_area) = if self.show_detail {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(58), Constraint::Min(0)])
                .split(content);
            (chunks[0], Some(chunks[1]))
        } else {
            (content, None)
        };

        let rankers = filter_rankers(users, self.filter.tier);
        if rankers.is_empty() {
            let message = if users.is_empty() {
                "No ranked players yet.".to_string()
            } else {
                format!("No rankers in tier {} among the top {}.", filter_label(self.filter.tier), users.len())
            };
            rc.frame
                .render_widget(Paragraph::new(styled_line!(message; Color::DarkGray)), table_area);
        } else {
            // header plus margin take two rows
            let height = table_area.height.saturating_sub(2) as usize;
            let start = scroll_window(self.cursor, height, rc.scroll_offset as usize);

            let rows: Vec<Row> = rankers
                .iter()
                .enumerate()
                .skip(start)
                .map(|(i, (rank, user))| {
                    let row = Row::new(vec![
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
                    ]);
                    if i == self.cursor {
                        row.style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
                    } else {
                        row
                    }
                })
                .collect();

            let table = Table::new(
                rows,
                [
                    Constraint::Length(5),
                    Constraint::Min(16),
                    Constraint::Length(12),
                    Constraint::Length(5),
                    Constraint::Length(10),
                    Constraint::Length(8),
                ],
            )
            .header(
                header_row!("Rank", "Player", "Tier", "Lvl", "Score", "Win %")
                    .style(Style::default().fg(Color::LightBlue).add_modifier(Modifier::BOLD))
                    .bottom_margin(1),
            )
            .column_spacing(2);
            rc.frame.render_widget(table, table_area);
        }

        if let Some(area) = detail_area {
            self.render_detail_pane(rc.frame, area);
        }
    }

    fn render_detail_pane(&self, frame: &mut ratatui::Frame, area: Rect) {
        let rc = RenderContext {
            frame,
            area,
            scroll_offset: 0,
            block: Block::bordered()
                .title("Player Details")
                .border_style(Style::default().fg(Color::DarkGray)),
        };
        if self.selected().is_none() {
            rc.placeholder("No player selected.");
            return;
        }
        render_data(&self.detail, rc, |detail, rc| {
            let paragraph = Paragraph::new(detail_lines(detail))
                .block(rc.block)
                .wrap(Wrap { trim: false });
            rc.frame.render_widget(paragraph, rc.area);
        });
    }
}

fn detail_lines(detail: &UserDetail) -> Vec<Line<'static>> {
    let mut lines = vec![
        styled_line!(detail.nickname.clone(); Bold Color::White),
        styled_line!(LIST [
            styled_span!(detail.tier.code(); tier_color(detail.tier)),
            styled_span!("  level {}  score {}", detail.level, format_thousands(detail.ranking_score)),
        ]),
    ];
    if let Some(created_at) = detail.created_at {
        lines.push(styled_line!("Joined {}", created_at.format("%Y-%m-%d"); Color::DarkGray));
    }
    lines.push(styled_line!());

    let Some(stats) = &detail.stats else {
        lines.push(styled_line!("No match statistics recorded."; Color::DarkGray));
        return lines;
    };

    lines.push(styled_line!(
        "Games {}  ({}W / {}L)",
        format_thousands(stats.total_games),
        stats.wins,
        stats.losses
    ));
    lines.push(styled_line!(LIST [
        styled_span!("Win rate "),
        styled_span!("{:.1}%", stats.win_rate; eval_color_scale_descending(stats.win_rate, &win_rate_scale())),
    ]));
    lines.push(styled_line!("Play time {}h {:02}m", stats.play_time / 60, stats.play_time % 60));

    lines.push(styled_line!());
    lines.push(styled_line!("Most used items"; Color::Rgb(200, 150, 0)));
    for usage in stats
        .item_usages
        .iter()
        .sorted_by_key(|u| std::cmp::Reverse(u.usage_count))
        .take(DETAIL_USAGES)
    {
        lines.push(styled_line!("  {:<20} {:>6}", usage.item.name, format_thousands(usage.usage_count)));
    }

    lines.push(styled_line!());
    lines.push(styled_line!("Most used skills"; Color::Rgb(200, 150, 0)));
    for usage in stats
        .skill_usages
        .iter()
        .sorted_by_key(|u| std::cmp::Reverse(u.usage_count))
        .take(DETAIL_USAGES)
    {
        lines.push(styled_line!("  {:<20} {:>6}", usage.skill.name, format_thousands(usage.usage_count)));
    }

    lines
}

impl RenderableView for RankingView {
    fn title(&self) -> &str {
        "Ranking"
    }

    fn update(&mut self, controller: &Controller, keys: &[KeyCode]) {
        let before = self.filter;
        for key in keys {
            match key {
                KeyCode::Char('t') => self.filter.next_tier(),
                KeyCode::Char('T') => self.filter.previous_tier(),
                KeyCode::Char('l') => self.filter.next_limit(),
                KeyCode::Char('j') => self.move_cursor(controller, true),
                KeyCode::Char('k') => self.move_cursor(controller, false),
                KeyCode::Char('i') => {
                    self.show_detail = !self.show_detail;
                    if self.show_detail {
                        self.request_detail(controller);
                    }
                }
                _ => {}
            }
        }
        if self.filter != before {
            self.refresh_data(controller);
        }

        self.data.try_update();
        self.detail.try_update();
    }

    fn refresh_data(&mut self, controller: &Controller) {
        self.cursor = 0;
        self.show_detail = false;
        let manager = controller.manager.clone();
        let filter = self.filter;
        self.data.request(move || manager.load_rankings(&filter));
    }

    fn is_loading(&self) -> bool {
        self.data.is_loading() || (self.show_detail && self.detail.is_loading())
    }

    fn hints(&self) -> &str {
        "t/T tier, l limit, j/k select, i details"
    }

    fn route(&self) -> Option<Route> {
        Some(Route::Ranking)
    }

    fn render(&self, rc: RenderContext) {
        render_data(&self.data, rc, |users, rc| self.render_rankers(users, rc));
    }
}
