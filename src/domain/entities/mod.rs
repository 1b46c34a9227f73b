pub mod offline;
pub mod project;
pub mod stored_entity;
pub mod task;

pub use project::{Project, ProjectDraft};
pub use stored_entity::StoredEntity;
pub use task::{Task, TaskDraft};
