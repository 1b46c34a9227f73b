pub mod api_routes;
pub mod dispatcher;
pub mod entity_store;
pub mod expiry_sweeper;
pub mod message_router;
pub mod project_service;
pub mod reconciler;
pub mod replay_engine;
pub mod task_service;
pub mod version_tracker;

pub use api_routes::{AccessToken, ApiRoutes};
pub use dispatcher::OfflineDispatcher;
pub use entity_store::EntityStore;
pub use expiry_sweeper::{ExpirySweeper, SweeperHandle};
pub use message_router::MessageRouter;
pub use project_service::ProjectService;
pub use reconciler::ReconcilerRegistry;
pub use replay_engine::ReplayEngine;
pub use task_service::TaskService;
pub use version_tracker::VersionTracker;
