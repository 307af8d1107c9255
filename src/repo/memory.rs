use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use reqwest::StatusCode;

use super::{ApiError, Result, TaskRepository};
use crate::domain::task::{Task, TaskFields, TaskId};

/// Stand-in backend that behaves like the REST API: ids are assigned from 1
/// upward, a missing priority is rejected, unknown ids answer 404.
#[derive(Default)]
pub struct InMemoryTaskRepo {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    items: Vec<Task>,
    last_id: i64,
}

impl InMemoryTaskRepo {
    pub fn with_seed(seed: impl IntoIterator<Item = TaskFields>) -> Self {
        let repo = Self::default();
        {
            let mut state = repo.lock();
            for fields in seed {
                let priority = fields.priority.unwrap_or(1);
                state.insert(fields, priority);
            }
        }
        repo
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl State {
    fn insert(&mut self, fields: TaskFields, priority: i64) {
        self.last_id += 1;
        self.items.push(Task {
            id: TaskId(self.last_id),
            name: fields.name,
            priority,
            status: fields.status,
        });
    }
}

fn require_priority(fields: &TaskFields) -> Result<i64> {
    fields
        .priority
        .ok_or_else(|| ApiError::status(StatusCode::BAD_REQUEST, "Priority must be a number."))
}

fn not_found(id: TaskId) -> ApiError {
    ApiError::status(StatusCode::NOT_FOUND, format!("Task {id} not found."))
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepo {
    async fn list(&self) -> Result<Vec<Task>> {
        Ok(self.lock().items.clone())
    }

    async fn create(&self, fields: &TaskFields) -> Result<()> {
        let priority = require_priority(fields)?;
        self.lock().insert(fields.clone(), priority);
        Ok(())
    }

    async fn update(&self, id: TaskId, fields: &TaskFields) -> Result<()> {
        let priority = require_priority(fields)?;
        let mut state = self.lock();
        let task = state
            .items
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found(id))?;
        task.name = fields.name.clone();
        task.priority = priority;
        task.status = fields.status;
        Ok(())
    }

    async fn delete(&self, id: TaskId) -> Result<()> {
        let mut state = self.lock();
        let pos = state
            .items
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| not_found(id))?;
        state.items.remove(pos);
        Ok(())
    }
}
