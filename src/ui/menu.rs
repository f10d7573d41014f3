use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::ui::{route::Route, views::*, Controller};

pub struct Menu {
    menu_entries: Vec<MenuEntry>,
    selected: usize,
}

struct MenuEntry {
    description: String,
    factory: Option<ViewFactory>,
}

type ViewFactory = fn(&Controller) -> Box<dyn RenderableView>;

impl Menu {
    pub fn new() -> Self {
        let menu_entries = Self::get_menu_entries();
        let selected = menu_entries.iter().position(|e| e.factory.is_some()).unwrap_or(0);
        Self { menu_entries, selected }
    }

    pub fn next(&mut self) {
        if self.menu_entries.is_empty() {
            return;
        }
        let len = self.menu_entries.len();
        let mut i = self.selected;
        loop {
            i = (i + 1) % len;
            if self.menu_entries[i].factory.is_some() {
                self.selected = i;
                break;
            }
            if i == self.selected {
                break; // no selectable entries
            }
        }
    }

    pub fn previous(&mut self) {
        if self.menu_entries.is_empty() {
            return;
        }
        let len = self.menu_entries.len();
        let mut i = self.selected;
        loop {
            i = if i == 0 { len - 1 } else { i - 1 };
            if self.menu_entries[i].factory.is_some() {
                self.selected = i;
                break;
            }
            if i == self.selected {
                break; // no selectable entries
            }
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .menu_entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                if entry.factory.is_none() {
                    ListItem::new(format!("━━ {} ━━", entry.description))
                        .style(Style::default().fg(Color::LightYellow).add_modifier(Modifier::BOLD))
                } else {
                    let prefix = if i == self.selected { "  ► " } else { "    " };
                    ListItem::new(format!("{}{}", prefix, entry.description))
                }
            })
            .collect();

        let mut list_state = ListState::default();
        list_state.select(Some(self.selected));

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Rgb(200, 150, 0)))
                    .padding(ratatui::widgets::Padding::uniform(1))
                    .title("Pages")
                    .title_style(
                        Style::default()
                            .fg(Color::Rgb(200, 150, 0))
                            .add_modifier(Modifier::BOLD),
                    ),
            )
            .highlight_style(Style::default().bg(Color::White).fg(Color::Black))
            .highlight_symbol("");

        frame.render_stateful_widget(list, area, &mut list_state);
    }

    pub fn get_factory(&self) -> Option<ViewFactory> {
        self.menu_entries.get(self.selected).and_then(|e| e.factory)
    }

    fn get_menu_entries() -> Vec<MenuEntry> {
        macro_rules! menu_entry {
            (group: $desc:expr) => {
                MenuEntry {
                    description: $desc.to_string(),
                    factory: None,
                }
            };
            (route: $route:expr) => {
                MenuEntry {
                    description: format!("[{}] {}", $route.hotkey(), $route.label()),
                    factory: Some(|ctrl| $route.open(ctrl)),
                }
            };
            (item: $desc:expr, $view:ty) => {
                MenuEntry {
                    description: $desc.to_string(),
                    factory: Some(|ctrl| Box::new(<$view>::new(ctrl))),
                }
            };
        }

        vec![
            // Statistics
            menu_entry!(group: "Statistics"),
            menu_entry!(route: Route::Dashboard),
            menu_entry!(route: Route::Ranking),
            menu_entry!(route: Route::Items),
            menu_entry!(route: Route::Skills),
            // Catalog
            menu_entry!(group: "Catalog"),
            menu_entry!(item: "Player Directory", PlayerDirectoryView),
            menu_entry!(item: "Item Catalog", ItemCatalogView),
            menu_entry!(item: "Skill Catalog", SkillCatalogView),
        ]
    }
}

impl Default for Menu {
    fn default() -> Self {
        Self::new()
    }
}
