//! Task board state and its transitions.
//!
//! The board never talks to the network itself. Operations that need the
//! backend return a [`Request`]; the outcome comes back as a [`Completion`]
//! through [`TaskBoard::apply`], which may ask for a follow-up request. After
//! every successful write that follow-up is a full fetch, so `tasks` is always
//! the last list the backend returned.

use tracing::{info, warn};

use crate::domain::task::{Task, TaskDraft, TaskFields, TaskId};
use crate::repo::ApiError;

pub const ADD_FAILED: &str = "Failed to add task.";
pub const UPDATE_FAILED: &str = "Failed to update task.";
pub const DELETE_FAILED: &str = "Failed to delete task.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Fetch,
    Create(TaskFields),
    Update(TaskId, TaskFields),
    Delete(TaskId),
}

#[derive(Debug)]
pub enum Completion {
    Fetched(Result<Vec<Task>, ApiError>),
    Created(Result<(), ApiError>),
    Updated {
        id: TaskId,
        result: Result<(), ApiError>,
    },
    Deleted {
        id: TaskId,
        result: Result<(), ApiError>,
    },
}

/// The row currently in edit mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTask {
    pub id: TaskId,
    pub draft: TaskDraft,
    /// Set once the edit was submitted; the row closes when that update lands.
    pub saving: bool,
}

#[derive(Debug, Default)]
pub struct TaskBoard {
    pub tasks: Vec<Task>,
    pub draft: TaskDraft,
    pub editing: Option<EditTask>,
    pub error: String,
}

impl TaskBoard {
    pub fn fetch_tasks(&self) -> Request {
        Request::Fetch
    }

    pub fn add_task(&self) -> Request {
        Request::Create(self.draft.fields())
    }

    pub fn update_task(&self, id: TaskId, fields: TaskFields) -> Request {
        Request::Update(id, fields)
    }

    /// Returns `None` unless the task is known and completed.
    pub fn delete_task(&self, id: TaskId) -> Option<Request> {
        self.task(id)
            .filter(|task| task.is_deletable())
            .map(|task| Request::Delete(task.id))
    }

    pub fn start_edit(&mut self, task: &Task) {
        self.editing = Some(EditTask {
            id: task.id,
            draft: TaskDraft::from(task),
            saving: false,
        });
    }

    pub fn save_edit(&mut self) -> Option<Request> {
        let edit = self.editing.as_mut()?;
        edit.saving = true;
        let (id, fields) = (edit.id, edit.draft.fields());
        Some(self.update_task(id, fields))
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    pub fn is_editing(&self, id: TaskId) -> bool {
        self.editing.as_ref().is_some_and(|edit| edit.id == id)
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn apply(&mut self, completion: Completion) -> Option<Request> {
        match completion {
            Completion::Fetched(Ok(tasks)) => {
                self.tasks = tasks;
                None
            }
            Completion::Fetched(Err(err)) => {
                warn!(error = %err, "failed to fetch tasks");
                None
            }
            Completion::Created(Ok(())) => {
                info!("task created");
                self.draft = TaskDraft::default();
                self.error.clear();
                Some(Request::Fetch)
            }
            Completion::Created(Err(err)) => {
                self.fail(&err, ADD_FAILED);
                None
            }
            Completion::Updated { id, result } => {
                if self
                    .editing
                    .as_ref()
                    .is_some_and(|edit| edit.id == id && edit.saving)
                {
                    self.editing = None;
                }
                match result {
                    Ok(()) => {
                        info!(%id, "task updated");
                        self.error.clear();
                        Some(Request::Fetch)
                    }
                    Err(err) => {
                        self.fail(&err, UPDATE_FAILED);
                        None
                    }
                }
            }
            Completion::Deleted { id, result } => match result {
                Ok(()) => {
                    info!(%id, "task deleted");
                    Some(Request::Fetch)
                }
                Err(err) => {
                    self.fail(&err, DELETE_FAILED);
                    None
                }
            },
        }
    }

    fn fail(&mut self, err: &ApiError, fallback: &str) {
        warn!(error = %err, "{fallback}");
        self.error = err.body().unwrap_or(fallback).to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::Status;
    use reqwest::StatusCode;

    fn task(id: i64, name: &str, priority: i64, status: Status) -> Task {
        Task {
            id: TaskId(id),
            name: name.to_string(),
            priority,
            status,
        }
    }

    fn board_with(tasks: Vec<Task>) -> TaskBoard {
        TaskBoard {
            tasks,
            ..TaskBoard::default()
        }
    }

    fn bad_request(body: &str) -> ApiError {
        ApiError::status(StatusCode::BAD_REQUEST, body)
    }

    #[test]
    fn starts_empty_with_default_draft() {
        let board = TaskBoard::default();
        assert!(board.tasks.is_empty());
        assert_eq!(board.draft, TaskDraft::default());
        assert!(board.editing.is_none());
        assert!(board.error.is_empty());
        assert_eq!(board.fetch_tasks(), Request::Fetch);
    }

    #[test]
    fn fetch_replaces_the_list() {
        let mut board = board_with(vec![task(1, "old", 1, Status::NotStarted)]);
        let fresh = vec![task(2, "new", 3, Status::InProgress)];
        assert_eq!(board.apply(Completion::Fetched(Ok(fresh.clone()))), None);
        assert_eq!(board.tasks, fresh);
    }

    #[test]
    fn fetch_failure_is_silent() {
        let mut board = board_with(vec![task(1, "keep", 1, Status::NotStarted)]);
        board.apply(Completion::Fetched(Err(bad_request("boom"))));
        assert_eq!(board.tasks.len(), 1);
        assert!(board.error.is_empty());
    }

    #[test]
    fn add_sends_draft_and_resets_it_on_success() {
        let mut board = TaskBoard::default();
        board.draft.name = "Write spec".to_string();
        board.draft.priority = "2".to_string();
        board.error = "stale".to_string();

        let request = board.add_task();
        assert_eq!(
            request,
            Request::Create(TaskFields {
                name: "Write spec".to_string(),
                priority: Some(2),
                status: Status::NotStarted,
            })
        );

        assert_eq!(board.apply(Completion::Created(Ok(()))), Some(Request::Fetch));
        assert_eq!(board.draft, TaskDraft::default());
        assert!(board.error.is_empty());
    }

    #[test]
    fn add_failure_keeps_draft_and_shows_body() {
        let mut board = TaskBoard::default();
        board.draft.name = "x".to_string();
        board.apply(Completion::Created(Err(bad_request("Name too short"))));
        assert_eq!(board.draft.name, "x");
        assert_eq!(board.error, "Name too short");
    }

    #[test]
    fn write_failures_without_body_use_fallbacks() {
        let mut board = board_with(vec![task(1, "a", 1, Status::Completed)]);
        let empty = || ApiError::status(StatusCode::INTERNAL_SERVER_ERROR, "");

        board.apply(Completion::Created(Err(empty())));
        assert_eq!(board.error, ADD_FAILED);
        board.apply(Completion::Updated {
            id: TaskId(1),
            result: Err(empty()),
        });
        assert_eq!(board.error, UPDATE_FAILED);
        board.apply(Completion::Deleted {
            id: TaskId(1),
            result: Err(empty()),
        });
        assert_eq!(board.error, DELETE_FAILED);
        assert_eq!(board.tasks.len(), 1);
    }

    #[test]
    fn delete_only_offered_for_completed_tasks() {
        let board = board_with(vec![
            task(1, "a", 1, Status::NotStarted),
            task(2, "b", 1, Status::InProgress),
            task(3, "c", 1, Status::Completed),
        ]);
        assert_eq!(board.delete_task(TaskId(1)), None);
        assert_eq!(board.delete_task(TaskId(2)), None);
        assert_eq!(board.delete_task(TaskId(3)), Some(Request::Delete(TaskId(3))));
        assert_eq!(board.delete_task(TaskId(99)), None);
    }

    #[test]
    fn delete_success_refetches_without_touching_error() {
        let mut board = board_with(vec![task(3, "c", 1, Status::Completed)]);
        board.error = "earlier failure".to_string();
        let next = board.apply(Completion::Deleted {
            id: TaskId(3),
            result: Ok(()),
        });
        assert_eq!(next, Some(Request::Fetch));
        assert_eq!(board.error, "earlier failure");
    }

    #[test]
    fn only_one_row_is_edited_at_a_time() {
        let a = task(1, "a", 1, Status::NotStarted);
        let b = task(2, "b", 2, Status::InProgress);
        let mut board = board_with(vec![a.clone(), b.clone()]);

        board.start_edit(&a);
        board.start_edit(&b);
        assert!(!board.is_editing(a.id));
        assert!(board.is_editing(b.id));
        assert_eq!(board.editing.as_ref().unwrap().draft, TaskDraft::from(&b));
    }

    #[test]
    fn cancel_edit_sends_nothing() {
        let a = task(1, "a", 1, Status::NotStarted);
        let mut board = board_with(vec![a.clone()]);
        board.start_edit(&a);
        board.cancel_edit();
        assert!(board.editing.is_none());
        assert_eq!(board.save_edit(), None);
    }

    #[test]
    fn save_edit_closes_row_after_success() {
        let a = task(1, "Write spec", 2, Status::NotStarted);
        let mut board = board_with(vec![a.clone()]);
        board.start_edit(&a);
        board.editing.as_mut().unwrap().draft.status = Status::Completed;

        let request = board.save_edit();
        assert_eq!(
            request,
            Some(Request::Update(
                TaskId(1),
                TaskFields {
                    name: "Write spec".to_string(),
                    priority: Some(2),
                    status: Status::Completed,
                }
            ))
        );
        assert!(board.is_editing(a.id));

        let next = board.apply(Completion::Updated {
            id: TaskId(1),
            result: Ok(()),
        });
        assert_eq!(next, Some(Request::Fetch));
        assert!(board.editing.is_none());
    }

    #[test]
    fn save_edit_closes_row_after_failure_too() {
        let a = task(1, "a", 1, Status::NotStarted);
        let mut board = board_with(vec![a.clone()]);
        board.start_edit(&a);
        board.save_edit();

        let next = board.apply(Completion::Updated {
            id: TaskId(1),
            result: Err(bad_request("Invalid status")),
        });
        assert_eq!(next, None);
        assert!(board.editing.is_none());
        assert_eq!(board.error, "Invalid status");
        assert_eq!(board.tasks, vec![a]);
    }

    #[test]
    fn unrelated_update_leaves_open_edit_alone() {
        let a = task(1, "a", 1, Status::NotStarted);
        let b = task(2, "b", 1, Status::NotStarted);
        let mut board = board_with(vec![a.clone(), b.clone()]);
        board.start_edit(&a);
        board.save_edit();
        board.start_edit(&b);

        board.apply(Completion::Updated {
            id: TaskId(1),
            result: Ok(()),
        });
        assert!(board.is_editing(b.id));
    }

    #[test]
    fn update_success_clears_error() {
        let mut board = TaskBoard {
            error: "old".to_string(),
            ..TaskBoard::default()
        };
        let request = board.update_task(
            TaskId(4),
            TaskFields {
                name: String::new(),
                priority: None,
                status: Status::InProgress,
            },
        );
        assert!(matches!(request, Request::Update(TaskId(4), _)));
        board.apply(Completion::Updated {
            id: TaskId(4),
            result: Ok(()),
        });
        assert!(board.error.is_empty());
    }
}
