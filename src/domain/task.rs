use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub i64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::NotStarted => "Not Started",
            Status::InProgress => "In Progress",
            Status::Completed => "Completed",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Status::NotStarted => Status::InProgress,
            Status::InProgress => Status::Completed,
            Status::Completed => Status::NotStarted,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Status::NotStarted => Status::Completed,
            Status::InProgress => Status::NotStarted,
            Status::Completed => Status::InProgress,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub priority: i64,
    pub status: Status,
}

impl Task {
    /// Only completed tasks may be deleted.
    pub fn is_deletable(&self) -> bool {
        self.status == Status::Completed
    }
}

/// Body of create and update requests. `priority` is `None` when the typed
/// text was not a number and goes out as JSON `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFields {
    pub name: String,
    pub priority: Option<i64>,
    pub status: Status,
}

/// Field values as the user is typing them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub name: String,
    pub priority: String,
    pub status: Status,
}

impl Default for TaskDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            priority: "1".to_string(),
            status: Status::NotStarted,
        }
    }
}

impl TaskDraft {
    pub fn fields(&self) -> TaskFields {
        TaskFields {
            name: self.name.clone(),
            priority: parse_priority(&self.priority),
            status: self.status,
        }
    }
}

impl From<&Task> for TaskDraft {
    fn from(task: &Task) -> Self {
        Self {
            name: task.name.clone(),
            priority: task.priority.to_string(),
            status: task.status,
        }
    }
}

/// Lenient integer parse of a number input: leading whitespace, an optional
/// sign, then as many digits as are present. Trailing junk is ignored.
pub fn parse_priority(text: &str) -> Option<i64> {
    let s = text.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let magnitude: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
