use std::sync::Arc;

use pollbox_db::Database;
use pollbox_types::Clock;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    /// Injected so list/detail filtering and the recency flag are
    /// deterministic under test.
    pub clock: Arc<dyn Clock>,
}
