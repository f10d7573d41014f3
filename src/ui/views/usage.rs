//! Pieces shared by the item and skill analysis pages.

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Direction, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};

use crate::{
    model::{
        choice::{filter_label, Choice},
        filter::UsageFilter,
    },
    service::metrics::UsagePoint,
    styled_line, styled_span,
};

use super::{filter_line, format_thousands};

pub const USAGE_HINTS: &str = "y/Y type, t/T tier, l limit";

/// Applies the filter keys, returns whether the filter changed
pub fn apply_filter_keys<K: Choice>(filter: &mut UsageFilter<K>, keys: &[KeyCode]) -> bool {
    let before = *filter;
    for key in keys {
        match key {
            KeyCode::Char('y') => filter.next_kind(),
            KeyCode::Char('Y') => filter.previous_kind(),
            KeyCode::Char('t') => filter.next_tier(),
            KeyCode::Char('T') => filter.previous_tier(),
            KeyCode::Char('l') => filter.next_limit(),
            _ => {}
        }
    }
    *filter != before
}

pub fn usage_filter_line<K: Choice>(filter: &UsageFilter<K>) -> Line<'static> {
    filter_line(&[
        ("Type", filter_label(filter.kind).to_string()),
        ("Tier", filter_label(filter.tier).to_string()),
        ("Limit", filter.limit.to_string()),
    ])
}

pub fn render_usage_chart(frame: &mut Frame, area: Rect, title: &str, series: &[UsagePoint], color: Color) {
    let block = Block::default()
        .borders(Borders::TOP)
        .title(title.to_string())
        .title_style(Style::default().add_modifier(Modifier::BOLD));

    if series.is_empty() {
        let paragraph = Paragraph::new(styled_line!("No usage recorded for this filter."; Color::DarkGray)).block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let bars: Vec<Bar> = series
        .iter()
        .map(|point| {
            Bar::default()
                .value(point.usage_count)
                .label(Line::from(point.name.clone()))
                .text_value(format_thousands(point.usage_count))
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(Color::Black).bg(color))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .data(BarGroup::default().bars(&bars));

    frame.render_widget(chart, area);
}

/// Preferred entries of the top rankers as a numbered list
pub fn render_top_panel(frame: &mut Frame, area: Rect, top_percent: u32, top_user_count: u64, entries: &[(String, u64)]) {
    let block = Block::default()
        .borders(Borders::TOP | Borders::LEFT)
        .title(format!("Top {}% ({} players)", top_percent, top_user_count))
        .title_style(Style::default().add_modifier(Modifier::BOLD));

    let lines = if entries.is_empty() {
        vec![styled_line!(" No data from top players."; Color::DarkGray)]
    } else {
        entries
            .iter()
            .enumerate()
            .map(|(i, (name, count))| {
                styled_line!(LIST [
                    styled_span!(" {}. ", i + 1; Color::DarkGray),
                    styled_span!(name),
                    styled_span!("  {}", format_thousands(*count); Color::Rgb(200, 150, 0)),
                ])
            })
            .collect()
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
