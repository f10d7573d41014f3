use std::{fmt, sync::Arc, thread};

use log::info;

use crate::{
    model::{
        analysis::{DashboardData, ItemAnalysis, SkillAnalysis},
        filter::{ItemFilter, RankingFilter, SkillFilter, DEFAULT_TOP_PERCENT},
        ids::UserId,
        item::Item,
        skill::Skill,
        user::{User, UserDetail, UserPage},
    },
    service::statsapi::{ApiError, ApiResult, StatsApi},
};

/// Number of rankers shown on the dashboard
pub const DASHBOARD_RANKERS: u32 = 10;

/// Fetch sets of the views. Every call blocks; views run them on worker threads.
#[derive(Clone)]
pub struct DataManager {
    api: Arc<dyn StatsApi>,
    top_percent: u32,
}

impl DataManager {
    pub fn new(api: Arc<dyn StatsApi>) -> Self {
        Self {
            api,
            top_percent: DEFAULT_TOP_PERCENT,
        }
    }

    pub fn with_top_percent(mut self, top_percent: u32) -> Self {
        self.top_percent = top_percent.clamp(1, 100);
        self
    }

    pub fn top_percent(&self) -> u32 {
        self.top_percent
    }

    pub fn load_dashboard(&self) -> DataRetrievalResult<DashboardData> {
        info!("Loading dashboard");
        let (tier_stats, top_rankers) = join_both(
            || self.api.tier_stats(),
            || self.api.top_rankers(DASHBOARD_RANKERS, None),
        )?;
        Ok(DashboardData { tier_stats, top_rankers })
    }

    /// Tier filtering happens client-side, only the limit goes to the server
    pub fn load_rankings(&self, filter: &RankingFilter) -> DataRetrievalResult<Vec<User>> {
        info!("Loading rankings (limit {})", filter.limit);
        Ok(self.api.top_rankers(filter.limit, None)?)
    }

    pub fn load_item_analysis(&self, filter: &ItemFilter) -> DataRetrievalResult<ItemAnalysis> {
        info!("Loading item analysis {:?}", filter);
        let (popular, top_players) = join_both(
            || self.api.popular_items(filter),
            || self.api.top_player_items(self.top_percent),
        )?;
        Ok(ItemAnalysis { popular, top_players })
    }

    pub fn load_skill_analysis(&self, filter: &SkillFilter) -> DataRetrievalResult<SkillAnalysis> {
        info!("Loading skill analysis {:?}", filter);
        let (popular, top_players) = join_both(
            || self.api.popular_skills(filter),
            || self.api.top_player_skills(self.top_percent),
        )?;
        Ok(SkillAnalysis { popular, top_players })
    }

    pub fn load_user_detail(&self, id: UserId) -> DataRetrievalResult<UserDetail> {
        info!("Loading details of user {}", id);
        Ok(self.api.user_detail(id)?)
    }

    pub fn load_users(&self, page: u32) -> DataRetrievalResult<UserPage> {
        info!("Loading user page {}", page);
        Ok(self.api.users(page)?)
    }

    pub fn load_items(&self) -> DataRetrievalResult<Vec<Item>> {
        info!("Loading item catalog");
        Ok(self.api.items()?)
    }

    pub fn load_skills(&self) -> DataRetrievalResult<Vec<Skill>> {
        info!("Loading skill catalog");
        Ok(self.api.skills()?)
    }
}

/// Runs both calls concurrently and succeeds only if both do
fn join_both<A, B, FA, FB>(first: FA, second: FB) -> DataRetrievalResult<(A, B)>
where
    A: Send,
    B: Send,
    FA: FnOnce() -> ApiResult<A> + Send,
    FB: FnOnce() -> ApiResult<B> + Send,
{
    thread::scope(|s| {
        let first = s.spawn(first);
        let second = s.spawn(second);
        let first = first.join();
        let second = second.join();

        let first = first.map_err(|_| DataRetrievalError::WorkerPanicked)??;
        let second = second.map_err(|_| DataRetrievalError::WorkerPanicked)??;
        Ok((first, second))
    })
}

pub type DataRetrievalResult<T> = Result<T, DataRetrievalError>;

#[derive(Debug)]
pub enum DataRetrievalError {
    Api(ApiError),
    WorkerPanicked,
}

impl fmt::Display for DataRetrievalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DataRetrievalError::Api(err) => write!(f, "{}", err),
            DataRetrievalError::WorkerPanicked => write!(f, "Request worker panicked"),
        }
    }
}

impl From<ApiError> for DataRetrievalError {
    fn from(error: ApiError) -> Self {
        Self::Api(error)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        model::{item::ItemType, user::Tier},
        service::statsapi::fake::FakeStatsApi,
    };

    fn manager(api: FakeStatsApi) -> (DataManager, Arc<FakeStatsApi>) {
        let api = Arc::new(api);
        (DataManager::new(api.clone()), api)
    }

    #[test]
    fn dashboard_combines_both_calls() {
        let (manager, api) = manager(FakeStatsApi::populated());

        let data = manager.load_dashboard().unwrap();

        assert_eq!(data.tier_stats.count(Tier::Bronze), 10);
        assert_eq!(data.top_rankers.len(), 5);
        let mut calls = api.calls();
        calls.sort();
        assert_eq!(calls, vec!["tier_stats", "top_rankers limit=10 tier=None"]);
    }

    #[test]
    fn one_failing_call_fails_the_whole_set() {
        let (manager, _) = manager(FakeStatsApi::populated().failing("top_player_items"));

        let result = manager.load_item_analysis(&ItemFilter::default());

        match result {
            Err(DataRetrievalError::Api(ApiError::Server { status, .. })) => assert_eq!(status, 500),
            other => panic!("expected server error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn rankings_never_send_the_tier() {
        let (manager, api) = manager(FakeStatsApi::populated());
        let filter = RankingFilter {
            limit: 50,
            tier: Some(Tier::Gold),
        };

        let users = manager.load_rankings(&filter).unwrap();

        assert_eq!(users.len(), 5);
        assert_eq!(api.calls(), vec!["top_rankers limit=50 tier=None"]);
    }

    #[test]
    fn analysis_uses_configured_percentile() {
        let (manager, api) = manager(FakeStatsApi::populated());
        let manager = manager.with_top_percent(25);
        let filter = ItemFilter {
            kind: Some(ItemType::Weapon),
            ..ItemFilter::default()
        };

        let analysis = manager.load_item_analysis(&filter).unwrap();

        assert_eq!(analysis.popular.len(), 1);
        assert_eq!(analysis.top_players.top_percent, 25);
        assert!(api.calls().contains(&"top_player_items 25".to_string()));
    }

    #[test]
    fn worker_panic_is_reported() {
        let result: DataRetrievalResult<(u8, u8)> = join_both(|| Ok(1), || panic!("boom"));
        assert!(matches!(result, Err(DataRetrievalError::WorkerPanicked)));
    }
}
