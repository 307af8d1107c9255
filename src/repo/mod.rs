use async_trait::async_trait;

use crate::domain::task::{Task, TaskFields, TaskId};

pub mod error;
pub mod http;
pub mod memory;

pub use error::{ApiError, Result};

/// Backend holding the authoritative task list. Writes report success only;
/// callers re-read the whole list afterwards.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Task>>;
    async fn create(&self, fields: &TaskFields) -> Result<()>;
    async fn update(&self, id: TaskId, fields: &TaskFields) -> Result<()>;
    async fn delete(&self, id: TaskId) -> Result<()>;
}
