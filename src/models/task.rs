use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum; the declaration order matches
/// severity so `ORDER BY priority` sorts from low to critical.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Critical,
}

/// Represents the category of a task.
/// Corresponds to the `task_category` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "task_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Personal,
    Work,
    Health,
    Education,
    Finance,
    Shopping,
    Travel,
    Other,
}

/// Input structure for creating a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    /// The title of the task. Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// An optional description, at most 1000 characters.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    /// Defaults to medium when omitted.
    pub priority: Option<TaskPriority>,

    /// Defaults to personal when omitted.
    pub category: Option<TaskCategory>,

    pub due_date: Option<DateTime<Utc>>,

    /// Free-text tags; insertion order is irrelevant.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Estimated effort in hours.
    #[validate(range(min = 0.1, max = 1000.0))]
    pub estimated_hours: Option<f64>,
}

/// Input structure for a partial task update. Only the supplied fields are
/// written; an empty title is treated as not supplied.
#[derive(Debug, Serialize, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[validate(length(max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    /// Toggling this also sets or clears `completed_at` in the same statement.
    pub is_completed: Option<bool>,

    pub priority: Option<TaskPriority>,

    pub category: Option<TaskCategory>,

    pub due_date: Option<DateTime<Utc>>,

    pub tags: Option<Vec<String>>,

    #[validate(range(min = 0.1, max = 1000.0))]
    pub estimated_hours: Option<f64>,

    #[validate(range(min = 0.1, max = 1000.0))]
    pub actual_hours: Option<f64>,
}

/// Represents a task entity as stored in the database and returned by the API.
///
/// The completion invariant holds at all times: `completed_at` is `Some` iff
/// `is_completed` is true. Every write that touches one touches the other.
#[derive(Debug, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// Identifier of the owning user. Not part of API responses.
    #[serde(skip_serializing, default)]
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub priority: TaskPriority,
    pub category: TaskCategory,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
}

impl Task {
    /// Creates a new pending `Task` from `CreateTaskRequest` and the owner's id.
    /// `priority` defaults to medium and `category` to personal.
    pub fn new(input: CreateTaskRequest, user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: input.title,
            description: input.description,
            is_completed: false,
            priority: input.priority.unwrap_or(TaskPriority::Medium),
            category: input.category.unwrap_or(TaskCategory::Personal),
            due_date: input.due_date,
            created_at: now,
            updated_at: now,
            completed_at: None,
            tags: input.tags,
            estimated_hours: input.estimated_hours,
            actual_hours: None,
        }
    }
}

/// Represents query parameters for filtering, sorting and paginating the task
/// listing. All filters are conjunctive.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFilter {
    pub completed: Option<bool>,
    pub priority: Option<TaskPriority>,
    pub category: Option<TaskCategory>,
    pub due_date_from: Option<DateTime<Utc>>,
    pub due_date_to: Option<DateTime<Utc>>,
    /// Case-insensitive substring match over title or description.
    pub search: Option<String>,
    /// Comma-separated list; a task matches when it carries any of the tags.
    pub tags: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// One of title, priority, category, dueDate, updatedAt, createdAt
    /// (case-insensitive); unknown values fall back to createdAt.
    pub sort_by: Option<String>,
    #[serde(default = "default_sort_descending")]
    pub sort_descending: bool,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    10
}

fn default_sort_descending() -> bool {
    true
}

impl Default for TaskFilter {
    fn default() -> Self {
        Self {
            completed: None,
            priority: None,
            category: None,
            due_date_from: None,
            due_date_to: None,
            search: None,
            tags: None,
            page: default_page(),
            page_size: default_page_size(),
            sort_by: None,
            sort_descending: default_sort_descending(),
        }
    }
}

impl TaskFilter {
    /// The 1-based page number, clamped to at least 1.
    pub fn page(&self) -> i64 {
        i64::from(self.page.max(1))
    }

    /// The page size, clamped to 1..=100.
    pub fn page_size(&self) -> i64 {
        i64::from(self.page_size.clamp(1, 100))
    }

    /// Splits the comma-separated tag filter into individual tags,
    /// dropping empty entries.
    pub fn tag_list(&self) -> Option<Vec<String>> {
        let tags: Vec<String> = self
            .tags
            .as_deref()?
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if tags.is_empty() {
            None
        } else {
            Some(tags)
        }
    }

    /// Maps the requested sort key to its column, falling back to `created_at`.
    pub fn sort_column(&self) -> &'static str {
        match self
            .sort_by
            .as_deref()
            .unwrap_or("")
            .to_lowercase()
            .as_str()
        {
            "title" => "title",
            "priority" => "priority",
            "category" => "category",
            "duedate" => "due_date",
            "updatedat" => "updated_at",
            _ => "created_at",
        }
    }

    /// The complete `ORDER BY` clause for the listing query.
    pub fn order_clause(&self) -> String {
        let direction = if self.sort_descending { "DESC" } else { "ASC" };
        format!("ORDER BY {} {}", self.sort_column(), direction)
    }
}

/// Aggregate counters over all of one user's tasks.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub pending_tasks: i64,
    /// Incomplete tasks whose due date lies strictly in the past.
    pub overdue_tasks: i64,
    /// Percentage of completed tasks, rounded to two decimals; 0 when there
    /// are no tasks.
    pub completion_rate: f64,
    /// Counts grouped by category; only categories that occur appear.
    pub tasks_by_category: HashMap<TaskCategory, i64>,
    /// Counts grouped by priority; only priorities that occur appear.
    pub tasks_by_priority: HashMap<TaskPriority, i64>,
}

/// Computes aggregate statistics over a user's tasks at the given instant.
pub fn compute_stats(tasks: &[Task], now: DateTime<Utc>) -> TaskStats {
    let total_tasks = tasks.len() as i64;
    let completed_tasks = tasks.iter().filter(|t| t.is_completed).count() as i64;
    let pending_tasks = total_tasks - completed_tasks;
    let overdue_tasks = tasks
        .iter()
        .filter(|t| !t.is_completed && t.due_date.map_or(false, |due| due < now))
        .count() as i64;

    let completion_rate = if total_tasks > 0 {
        let rate = completed_tasks as f64 / total_tasks as f64 * 100.0;
        (rate * 100.0).round() / 100.0
    } else {
        0.0
    };

    let mut tasks_by_category: HashMap<TaskCategory, i64> = HashMap::new();
    let mut tasks_by_priority: HashMap<TaskPriority, i64> = HashMap::new();
    for task in tasks {
        *tasks_by_category.entry(task.category).or_insert(0) += 1;
        *tasks_by_priority.entry(task.priority).or_insert(0) += 1;
    }

    TaskStats {
        total_tasks,
        completed_tasks,
        pending_tasks,
        overdue_tasks,
        completion_rate,
        tasks_by_category,
        tasks_by_priority,
    }
}
