pub mod ports;
pub mod services;

pub use services::{
    ExpirySweeper, MessageRouter, OfflineDispatcher, ProjectService, ReplayEngine, TaskService,
    VersionTracker,
};
