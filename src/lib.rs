// tasklist - Local-first task list persisted through a key-value adapter

pub mod codec;
pub mod config;
pub mod filter;
pub mod record;
pub mod storage;
pub mod store;
pub mod task;

// Re-export main types for convenience
pub use config::Config;
pub use filter::Filter;
pub use record::Record;
pub use storage::{FileStorage, KeyValueStore, MemoryStorage};
pub use store::{Counts, TaskStore};
pub use task::{TASKS_KEY, Task, now_ms};
