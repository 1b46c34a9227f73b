pub mod local_state_store;
mod mappers;
pub mod memory_store;
mod rows;
pub mod sqlite_store;

pub use local_state_store::SqliteLocalStateStore;
pub use memory_store::{InMemoryLocalStateStore, InMemoryOfflineRequestStore};
pub use sqlite_store::SqliteOfflineRequestStore;
