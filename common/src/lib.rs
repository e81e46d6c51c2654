// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};

/// Category label given to tasks created without one.
pub const DEFAULT_CATEGORY: &str = "Personal";

/// How urgent a task is.
///
/// The variant order is the sort order used by every task listing:
/// `Urgent` sorts first, `Low` last.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Urgent,
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Numeric rank, lower is more urgent (urgent=0 .. low=3).
    pub fn rank(self) -> u8 {
        match self {
            Priority::Urgent => 0,
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Urgent => "urgent",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a task owned by the task store.
///
/// Field names serialize in camelCase (`dueDate`, `completedAt`, ...) so the
/// JSON shape matches the seed files. Older seed files spell the identifier
/// `Id`; it is accepted as an alias.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(alias = "Id")]
    pub id: i64,

    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub priority: Priority,

    // Joined to `Category::name` by value. Nothing enforces that the
    // category still exists.
    pub category: String,

    // Only the calendar day matters for scheduling.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,

    #[serde(default)]
    pub completed: bool,

    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Applies a completion transition.
    ///
    /// `completed_at` is set to `now` when the task becomes completed and
    /// cleared when it becomes pending again. Setting the current state again
    /// is a no-op, so an existing completion timestamp is kept. The timestamp
    /// is never earlier than `created_at`.
    ///
    /// Returns `true` when the state actually changed.
    pub fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) -> bool {
        if self.completed == completed {
            return false;
        }
        self.completed = completed;
        self.completed_at = completed.then(|| now.max(self.created_at));
        true
    }

    /// `true` when the completion pair is consistent.
    pub fn completion_is_consistent(&self) -> bool {
        match (self.completed, self.completed_at) {
            (false, None) => true,
            (true, Some(at)) => at >= self.created_at,
            _ => false,
        }
    }
}

/// Fields accepted when creating a task.
///
/// Everything but the title is optional; the store fills in the defaults
/// (`medium` priority, `Personal` category, no due date).
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    // A missing title is left for the store to reject.
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "blank_or_date")]
    pub due_date: Option<NaiveDate>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial update for a task. Absent fields are left alone.
///
/// `due_date` distinguishes "absent" (`None`) from "clear it"
/// (`Some(None)`, a JSON `null` or `""`). There is no way to express a new `id` or
/// `createdAt`: unknown keys in the payload are ignored.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(
        default,
        deserialize_with = "present_blank_or_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Represents a category a task can be filed under.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(alias = "Id")]
    pub id: i64,
    pub name: String,
    pub color: String,
    // Informational only. The store does not keep it in sync with tasks.
    #[serde(default)]
    pub task_count: u32,
}

/// Fields accepted when creating a category.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Partial update for a category. Absent fields are left alone.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_count: Option<u32>,
}

// Date inputs send `""` for "no date".
fn blank_or_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<NaiveDate>()
            .map(Some)
            .map_err(|e| de::Error::custom(format!("invalid date {raw:?}: {e}"))),
    }
}

// A present key always yields `Some`, even when its value is `null`.
fn present_blank_or_date<'de, D>(deserializer: D) -> Result<Option<Option<NaiveDate>>, D::Error>
where
    D: Deserializer<'de>,
{
    blank_or_date(deserializer).map(Some)
}
