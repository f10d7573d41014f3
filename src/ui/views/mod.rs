use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Block,
};

use crate::{
    model::{item::ItemType, skill::SkillType, user::Tier},
    ui::{
        async_data::{AsyncData, DataState},
        route::Route,
        Controller, RenderContext,
    },
};

pub mod catalog;
pub mod dashboard;
pub mod items;
pub mod ranking;
pub mod skills;
mod usage;

pub use catalog::*;
pub use dashboard::*;
pub use items::*;
pub use ranking::*;
pub use skills::*;

/// Trait for rendering views in the TUI
pub trait RenderableView {
    /// Render the view into a ratatui Frame with scroll support
    fn render(&self, rc: RenderContext);

    /// Called every tick with the keys the shell did not consume
    fn update(&mut self, _controller: &Controller, _keys: &[KeyCode]) {}

    fn title(&self) -> &str;

    /// Reissues the current fetch set
    fn refresh_data(&mut self, controller: &Controller);

    fn is_loading(&self) -> bool;

    /// View specific key hints for the footer
    fn hints(&self) -> &str {
        ""
    }

    /// Link bar entry to highlight, `None` for views outside the link bar
    fn route(&self) -> Option<Route> {
        None
    }
}

/// Renders the placeholder or error of `data`, or hands the committed snapshot to `ready`
pub fn render_data<T>(data: &AsyncData<T>, rc: RenderContext, ready: impl FnOnce(&T, RenderContext)) {
    let rc = RenderContext {
        block: status_block(rc.block, data),
        ..rc
    };
    match data.state() {
        DataState::Idle | DataState::Loading => rc.placeholder("Loading data..."),
        DataState::Failed(err) => rc.error(&err.to_string()),
        DataState::Ready(snapshot) => ready(snapshot, rc),
    }
}

fn status_block<'b, T>(block: Block<'b>, data: &AsyncData<T>) -> Block<'b> {
    let status = match (data.is_loading(), data.fetched_at()) {
        (true, _) => " refreshing... ".to_string(),
        (false, Some(at)) => format!(" updated {} ", at.format("%H:%M:%S")),
        (false, None) => return block,
    };
    block.title_bottom(Line::from(status).right_aligned())
}

/// Filter line on top, content below
pub fn split_filter_area(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(area);
    (chunks[0], chunks[1])
}

pub fn filter_line(entries: &[(&str, String)]) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, (label, value)) in entries.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("   "));
        }
        spans.push(Span::styled(format!("{}: ", label), Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(
            value.clone(),
            Style::default().fg(Color::LightBlue).add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(spans)
}

pub fn tier_color(tier: Tier) -> Color {
    match tier {
        Tier::Bronze => Color::Rgb(205, 127, 50),
        Tier::Silver => Color::Gray,
        Tier::Gold => Color::Rgb(255, 215, 0),
        Tier::Platinum => Color::Rgb(0, 200, 170),
        Tier::Diamond => Color::LightBlue,
        Tier::Master => Color::Magenta,
        Tier::Grandmaster => Color::LightRed,
    }
}

pub fn item_type_color(item_type: ItemType) -> Color {
    match item_type {
        ItemType::Weapon => Color::Red,
        ItemType::Armor => Color::Blue,
        ItemType::Accessory => Color::Magenta,
        ItemType::Consumable => Color::Green,
    }
}

pub fn skill_type_color(skill_type: SkillType) -> Color {
    match skill_type {
        SkillType::Active => Color::Yellow,
        SkillType::Passive => Color::Cyan,
        SkillType::Ultimate => Color::LightRed,
    }
}

pub fn win_rate_scale() -> Vec<(f64, Color)> {
    vec![
        (60.0, Color::Green),
        (50.0, Color::Rgb(200, 255, 100)),
        (40.0, Color::Yellow),
        (0.0, Color::Red),
    ]
}

/// `1234567` becomes `1,234,567`
pub fn format_thousands<T: ToString>(value: T) -> String {
    let digits = value.to_string();
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest.to_string()),
        None => ("", digits),
    };
    let grouped = digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join(",");
    format!("{}{}", sign, grouped)
}

pub fn eval_color_scale_descending<T: PartialOrd>(
    value: T,
    scale: &[(T, ratatui::style::Color)],
) -> ratatui::style::Color {
    for (threshold, color) in scale {
        if value >= *threshold {
            return *color;
        }
    }
    scale
        .last()
        .map(|(_, color)| *color)
        .unwrap_or(ratatui::style::Color::White)
}

/// First row index to show so that `cursor` stays within `height` visible rows
pub fn scroll_window(cursor: usize, height: usize, scroll_offset: usize) -> usize {
    if height == 0 {
        return cursor;
    }
    let start = scroll_offset.min(cursor);
    if cursor >= start + height {
        cursor + 1 - height
    } else {
        start
    }
}

#[macro_export]
macro_rules! styled_span {
    // Expression with color and bold (expr; Bold Color::X)
    ($expr:expr; Bold $color:expr) => {
        ratatui::text::Span::styled(
            format!("{}", $expr),
            ratatui::style::Style::default()
                .fg($color)
                .add_modifier(ratatui::style::Modifier::BOLD)
        )
    };

    // Expression with color (expr; Color::X)
    ($expr:expr; $color:expr) => {
        ratatui::text::Span::styled(
            format!("{}", $expr),
            ratatui::style::Style::default().fg($color)
        )
    };

    // Formatted text with color (text, args...; Color::X)
    ($text:literal, $($arg:expr),+; $color:expr) => {
        ratatui::text::Span::styled(
            format!($text, $($arg),+),
            ratatui::style::Style::default().fg($color)
        )
    };

    // Formatted text (text, args...)
    ($text:literal, $($arg:expr),+) => {
        ratatui::text::Span::raw(format!($text, $($arg),+))
    };

    // Plain text literal
    ($text:literal) => {
        ratatui::text::Span::raw($text)
    };

    // Plain expression
    ($expr:expr) => {
        ratatui::text::Span::raw(format!("{}", $expr))
    };
}

#[macro_export]
macro_rules! styled_line {
    // Empty line
    () => {
        ratatui::text::Line::raw("")
    };

    // Span list
    (VAR $vec:expr) => {
        ratatui::text::Line::from($vec)
    };

    // Span list
    (LIST [$($args:expr),+ $(,)?]) => {
        ratatui::text::Line::from(vec![$($args),+])
    };

    // Full styled line
    ($($args:tt)+) => {
        ratatui::text::Line::from($crate::styled_span!($($args)+))
    };
}

#[macro_export]
macro_rules! header_row {
    ($($header:expr),+) => {
        ratatui::widgets::Row::new(vec![$(ratatui::widgets::Cell::from($header)),+])
    };
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_separator() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(1234567u64), "1,234,567");
        assert_eq!(format_thousands(-45000i64), "-45,000");
    }

    #[test]
    fn window_follows_cursor() {
        assert_eq!(scroll_window(0, 10, 0), 0);
        assert_eq!(scroll_window(9, 10, 0), 0);
        assert_eq!(scroll_window(10, 10, 0), 1);
        assert_eq!(scroll_window(3, 10, 5), 3);
        assert_eq!(scroll_window(25, 10, 20), 20);
    }

    #[test]
    fn color_scale_picks_first_threshold_reached() {
        assert_eq!(eval_color_scale_descending(75.0, &win_rate_scale()), Color::Green);
        assert_eq!(eval_color_scale_descending(45.0, &win_rate_scale()), Color::Yellow);
        assert_eq!(eval_color_scale_descending(-1.0, &win_rate_scale()), Color::Red);
    }
}
