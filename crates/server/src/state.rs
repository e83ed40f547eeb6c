use std::sync::Arc;

use events::EventBus;
use orchestrator::{AgentRegistry, ExecutionStore, Orchestrator, SqlStore};
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Orchestrator,
    pub event_bus: EventBus,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        let event_bus = orchestrator.bus().clone();
        Self {
            orchestrator,
            event_bus,
        }
    }

    /// Wire an orchestrator over a migrated pool and a fresh event bus.
    pub fn from_pool(pool: SqlitePool, registry: AgentRegistry) -> Self {
        let store: Arc<dyn ExecutionStore> = Arc::new(SqlStore::new(pool));
        Self::new(Orchestrator::new(registry, store, EventBus::new()))
    }

    pub fn store(&self) -> &Arc<dyn ExecutionStore> {
        self.orchestrator.store()
    }
}
