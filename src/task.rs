// Task data model

use crate::record::Record;
use serde::{Deserialize, Serialize};

/// Key the task list is persisted under
pub const TASKS_KEY: &str = "taskManager.tasks.v1";

/// A single to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub completed: bool,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

impl Task {
    /// Build a fresh, active task. The caller is responsible for trimming.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            completed: false,
            created_at: now_ms(),
        }
    }
}

impl Record for Task {
    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn storage_key() -> &'static str {
        TASKS_KEY
    }

    fn is_valid(&self) -> bool {
        !self.id.trim().is_empty() && !self.title.trim().is_empty()
    }
}

/// Generate a new unique task id
pub fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

/// Helper function to get current timestamp in milliseconds
pub fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms() {
        let ts = now_ms();
        assert!(ts > 0);
        // Should be reasonable timestamp (after year 2020)
        assert!(ts > 1_600_000_000_000);
    }

    #[test]
    fn test_new_task_defaults() {
        let task = Task::new("Buy milk");
        assert_eq!(task.title, "Buy milk");
        assert!(!task.completed);
        assert!(task.created_at > 1_600_000_000_000);
        assert!(!task.id.is_empty());
    }

    #[test]
    fn test_new_ids_are_unique() {
        let a = new_id();
        let b = new_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_task_serialization_field_names() {
        let task = Task {
            id: "t-1".to_string(),
            title: "Walk dog".to_string(),
            completed: true,
            created_at: 1_700_000_000_000,
        };

        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"id\":\"t-1\""));
        assert!(json.contains("\"title\":\"Walk dog\""));
        assert!(json.contains("\"completed\":true"));
        assert!(json.contains("\"createdAt\":1700000000000"));

        let deserialized: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, task);
    }

    #[test]
    fn test_task_validity() {
        let mut task = Task::new("ok");
        assert!(task.is_valid());

        task.title = "  ".to_string();
        assert!(!task.is_valid());
    }

    #[test]
    fn test_task_storage_key_is_versioned() {
        assert_eq!(Task::storage_key(), "taskManager.tasks.v1");
    }
}
