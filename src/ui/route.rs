use std::fmt;

use crate::ui::{views::*, Controller};

/// Top-level pages reachable from the link bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Ranking,
    Items,
    Skills,
}

impl Route {
    pub const ALL: [Route; 4] = [Route::Dashboard, Route::Ranking, Route::Items, Route::Skills];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Dashboard => "/",
            Route::Ranking => "/ranking",
            Route::Items => "/items",
            Route::Skills => "/skills",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim();
        let normalized = match trimmed.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        Self::ALL.into_iter().find(|r| r.path() == normalized)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Route::Dashboard => "Dashboard",
            Route::Ranking => "Ranking",
            Route::Items => "Items",
            Route::Skills => "Skills",
        }
    }

    pub fn hotkey(&self) -> char {
        match self {
            Route::Dashboard => '1',
            Route::Ranking => '2',
            Route::Items => '3',
            Route::Skills => '4',
        }
    }

    pub fn from_hotkey(key: char) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.hotkey() == key)
    }

    /// Creates a fresh view, which immediately starts loading
    pub fn open(&self, ctrl: &Controller) -> Box<dyn RenderableView> {
        match self {
            Route::Dashboard => Box::new(DashboardView::new(ctrl)),
            Route::Ranking => Box::new(RankingView::new(ctrl)),
            Route::Items => Box::new(ItemAnalysisView::new(ctrl)),
            Route::Skills => Box::new(SkillAnalysisView::new(ctrl)),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRoute(pub String);

impl fmt::Display for UnknownRoute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let known = Route::ALL.iter().map(|r| r.path()).collect::<Vec<_>>().join(", ");
        write!(f, "Unknown page '{}' (expected one of {})", self.0, known)
    }
}

impl std::error::Error for UnknownRoute {}

impl std::str::FromStr for Route {
    type Err = UnknownRoute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::from_path(s).ok_or_else(|| UnknownRoute(s.to_string()))
    }
}
