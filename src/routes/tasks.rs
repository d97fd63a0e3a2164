use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{
        compute_stats, CreateTaskRequest, PagedResult, Task, TaskFilter, UpdateTaskRequest,
    },
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::{Duration, NaiveTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const TASK_COLUMNS: &str = "id, user_id, title, description, is_completed, priority, category, \
     due_date, created_at, updated_at, completed_at, tags, estimated_hours, actual_hours";

/// Builds the conjunctive WHERE clause for the task listing. `$1` is always
/// the owner id; every active filter claims the next placeholder, in the same
/// fixed order the handler binds them. Returns the clause and the next free
/// placeholder index.
fn filter_where_clause(filter: &TaskFilter) -> (String, usize) {
    let mut conditions = vec!["user_id = $1".to_string()];
    let mut param = 2;

    if filter.completed.is_some() {
        conditions.push(format!("is_completed = ${}", param));
        param += 1;
    }
    if filter.priority.is_some() {
        conditions.push(format!("priority = ${}", param));
        param += 1;
    }
    if filter.category.is_some() {
        conditions.push(format!("category = ${}", param));
        param += 1;
    }
    if filter.due_date_from.is_some() {
        conditions.push(format!("due_date >= ${}", param));
        param += 1;
    }
    if filter.due_date_to.is_some() {
        conditions.push(format!("due_date <= ${}", param));
        param += 1;
    }
    if filter.search.is_some() {
        conditions.push(format!(
            "(title ILIKE ${} OR description ILIKE ${})",
            param,
            param + 1
        ));
        param += 2;
    }
    if filter.tag_list().is_some() {
        // any-of: the task's tag array overlaps the requested tags
        conditions.push(format!("tags && ${}", param));
        param += 1;
    }

    (conditions.join(" AND "), param)
}

/// Builds the SET clauses for a partial update. Only supplied fields appear;
/// an empty title is ignored. Toggling completion writes the flag and the
/// timestamp in the same statement, so the invariant can never be observed
/// half-applied. Returns the clauses and the next free placeholder index.
fn update_set_clauses(update: &UpdateTaskRequest) -> (Vec<String>, usize) {
    let mut sets = vec!["updated_at = NOW()".to_string()];
    let mut param = 1;

    if update.title.as_deref().map_or(false, |t| !t.trim().is_empty()) {
        sets.push(format!("title = ${}", param));
        param += 1;
    }
    if update.description.is_some() {
        sets.push(format!("description = ${}", param));
        param += 1;
    }
    match update.is_completed {
        Some(true) => sets.push("is_completed = TRUE, completed_at = NOW()".to_string()),
        Some(false) => sets.push("is_completed = FALSE, completed_at = NULL".to_string()),
        None => {}
    }
    if update.priority.is_some() {
        sets.push(format!("priority = ${}", param));
        param += 1;
    }
    if update.category.is_some() {
        sets.push(format!("category = ${}", param));
        param += 1;
    }
    if update.due_date.is_some() {
        sets.push(format!("due_date = ${}", param));
        param += 1;
    }
    if update.tags.is_some() {
        sets.push(format!("tags = ${}", param));
        param += 1;
    }
    if update.estimated_hours.is_some() {
        sets.push(format!("estimated_hours = ${}", param));
        param += 1;
    }
    if update.actual_hours.is_some() {
        sets.push(format!("actual_hours = ${}", param));
        param += 1;
    }

    (sets, param)
}

/// Retrieves a filtered, sorted, paginated listing of the authenticated
/// user's tasks.
///
/// ## Query Parameters (all optional):
/// - `completed`, `priority`, `category`: equality filters.
/// - `dueDateFrom` / `dueDateTo`: inclusive due-date range (RFC 3339).
/// - `search`: case-insensitive substring over title or description.
/// - `tags`: comma-separated; matches tasks carrying any of them.
/// - `sortBy`: title, priority, category, dueDate, updatedAt or createdAt
///   (default), with `sortDescending` (default true).
/// - `page` (1-based, default 1) and `pageSize` (default 10, max 100).
///
/// ## Responses:
/// - `200 OK`: a page envelope with `items`, `totalCount`, `totalPages`,
///   `hasNextPage` and `hasPreviousPage`.
/// - `401 Unauthorized`: missing or invalid token.
#[get("")]
pub async fn get_tasks(
    pool: web::Data<PgPool>,
    query_params: web::Query<TaskFilter>,
    auth_user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let filter = query_params.into_inner();
    let (where_clause, next_param) = filter_where_clause(&filter);
    let page = filter.page();
    let page_size = filter.page_size();

    let count_sql = format!("SELECT COUNT(*) FROM tasks WHERE {}", where_clause);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(auth_user.id);
    if let Some(completed) = filter.completed {
        count_query = count_query.bind(completed);
    }
    if let Some(priority) = filter.priority {
        count_query = count_query.bind(priority);
    }
    if let Some(category) = filter.category {
        count_query = count_query.bind(category);
    }
    if let Some(from) = filter.due_date_from {
        count_query = count_query.bind(from);
    }
    if let Some(to) = filter.due_date_to {
        count_query = count_query.bind(to);
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        count_query = count_query.bind(pattern.clone());
        count_query = count_query.bind(pattern);
    }
    if let Some(tags) = filter.tag_list() {
        count_query = count_query.bind(tags);
    }
    let total_count = count_query.fetch_one(&**pool).await?;

    let page_sql = format!(
        "SELECT {} FROM tasks WHERE {} {} LIMIT ${} OFFSET ${}",
        TASK_COLUMNS,
        where_clause,
        filter.order_clause(),
        next_param,
        next_param + 1
    );
    let mut page_query = sqlx::query_as::<_, Task>(&page_sql).bind(auth_user.id);
    if let Some(completed) = filter.completed {
        page_query = page_query.bind(completed);
    }
    if let Some(priority) = filter.priority {
        page_query = page_query.bind(priority);
    }
    if let Some(category) = filter.category {
        page_query = page_query.bind(category);
    }
    if let Some(from) = filter.due_date_from {
        page_query = page_query.bind(from);
    }
    if let Some(to) = filter.due_date_to {
        page_query = page_query.bind(to);
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        page_query = page_query.bind(pattern.clone());
        page_query = page_query.bind(pattern);
    }
    if let Some(tags) = filter.tag_list() {
        page_query = page_query.bind(tags);
    }
    let tasks = page_query
        .bind(page_size)
        .bind((page - 1) * page_size)
        .fetch_all(&**pool)
        .await?;

    Ok(HttpResponse::Ok().json(PagedResult::new(tasks, total_count, page, page_size)))
}

/// Creates a new task owned by the authenticated user.
///
/// ## Responses:
/// - `201 Created`: the new task as JSON.
/// - `400 Bad Request`: input validation failed.
/// - `401 Unauthorized`: missing or invalid token.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    task_data: web::Json<CreateTaskRequest>,
    auth_user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = Task::new(task_data.into_inner(), auth_user.id);

    let sql = format!(
        "INSERT INTO tasks (id, user_id, title, description, priority, category, due_date, \
         tags, estimated_hours) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING {}",
        TASK_COLUMNS
    );
    let result = sqlx::query_as::<_, Task>(&sql)
        .bind(task.id)
        .bind(task.user_id)
        .bind(task.title)
        .bind(task.description)
        .bind(task.priority)
        .bind(task.category)
        .bind(task.due_date)
        .bind(task.tags)
        .bind(task.estimated_hours)
        .fetch_one(&**pool)
        .await?;

    Ok(HttpResponse::Created().json(result))
}

/// Retrieves a single task by id.
///
/// The lookup intersects the task id with the owner id in one query, so a
/// task belonging to someone else is indistinguishable from a missing one.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    auth_user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let sql = format!(
        "SELECT {} FROM tasks WHERE id = $1 AND user_id = $2",
        TASK_COLUMNS
    );
    let task = sqlx::query_as::<_, Task>(&sql)
        .bind(task_id.into_inner())
        .bind(auth_user.id)
        .fetch_optional(&**pool)
        .await?;

    match task {
        Some(task) => Ok(HttpResponse::Ok().json(task)),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Partially updates a task.
///
/// Only supplied fields are written; setting `isCompleted` also sets or
/// clears `completedAt` within the same statement. One owner-scoped
/// `UPDATE ... RETURNING` is the whole operation.
///
/// ## Responses:
/// - `200 OK`: the updated task as JSON.
/// - `400 Bad Request`: input validation failed.
/// - `401 Unauthorized`: missing or invalid token.
/// - `404 Not Found`: unknown task, or owned by another user.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<UpdateTaskRequest>,
    auth_user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let update = task_data.into_inner();

    let (sets, next_param) = update_set_clauses(&update);
    let sql = format!(
        "UPDATE tasks SET {} WHERE id = ${} AND user_id = ${} RETURNING {}",
        sets.join(", "),
        next_param,
        next_param + 1,
        TASK_COLUMNS
    );

    let mut query = sqlx::query_as::<_, Task>(&sql);
    if let Some(title) = update.title.as_deref().filter(|t| !t.trim().is_empty()) {
        query = query.bind(title.to_string());
    }
    if let Some(description) = update.description {
        query = query.bind(description);
    }
    if let Some(priority) = update.priority {
        query = query.bind(priority);
    }
    if let Some(category) = update.category {
        query = query.bind(category);
    }
    if let Some(due_date) = update.due_date {
        query = query.bind(due_date);
    }
    if let Some(tags) = update.tags {
        query = query.bind(tags);
    }
    if let Some(estimated_hours) = update.estimated_hours {
        query = query.bind(estimated_hours);
    }
    if let Some(actual_hours) = update.actual_hours {
        query = query.bind(actual_hours);
    }

    let task = query
        .bind(task_id.into_inner())
        .bind(auth_user.id)
        .fetch_optional(&**pool)
        .await?;

    match task {
        Some(task) => Ok(HttpResponse::Ok().json(task)),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Deletes a task owned by the authenticated user.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    auth_user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
        .bind(task_id.into_inner())
        .bind(auth_user.id)
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Task not found".into()));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Task deleted successfully"
    })))
}

/// Marks a task as completed, stamping `completedAt`.
///
/// Idempotent: completing an already-completed task succeeds and refreshes
/// the timestamp.
#[post("/{id}/complete")]
pub async fn complete_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    auth_user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query(
        "UPDATE tasks SET is_completed = TRUE, completed_at = NOW(), updated_at = NOW() \
         WHERE id = $1 AND user_id = $2",
    )
    .bind(task_id.into_inner())
    .bind(auth_user.id)
    .execute(&**pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Task not found".into()));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Task marked as completed"
    })))
}

/// Marks a task as pending again, clearing `completedAt`.
#[post("/{id}/uncomplete")]
pub async fn uncomplete_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    auth_user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query(
        "UPDATE tasks SET is_completed = FALSE, completed_at = NULL, updated_at = NOW() \
         WHERE id = $1 AND user_id = $2",
    )
    .bind(task_id.into_inner())
    .bind(auth_user.id)
    .execute(&**pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Task not found".into()));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Task marked as not completed"
    })))
}

/// Aggregate statistics over all of the authenticated user's tasks.
#[get("/stats")]
pub async fn get_stats(
    pool: web::Data<PgPool>,
    auth_user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let sql = format!("SELECT {} FROM tasks WHERE user_id = $1", TASK_COLUMNS);
    let tasks = sqlx::query_as::<_, Task>(&sql)
        .bind(auth_user.id)
        .fetch_all(&**pool)
        .await?;

    Ok(HttpResponse::Ok().json(compute_stats(&tasks, Utc::now())))
}

/// Incomplete tasks due within the current UTC day.
#[get("/due-today")]
pub async fn get_tasks_due_today(
    pool: web::Data<PgPool>,
    auth_user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let today = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
    let tomorrow = today + Duration::days(1);

    let sql = format!(
        "SELECT {} FROM tasks \
         WHERE user_id = $1 AND NOT is_completed AND due_date >= $2 AND due_date < $3",
        TASK_COLUMNS
    );
    let tasks = sqlx::query_as::<_, Task>(&sql)
        .bind(auth_user.id)
        .bind(today)
        .bind(tomorrow)
        .fetch_all(&**pool)
        .await?;

    Ok(HttpResponse::Ok().json(tasks))
}

/// Incomplete tasks whose due date has already passed.
#[get("/overdue")]
pub async fn get_overdue_tasks(
    pool: web::Data<PgPool>,
    auth_user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let sql = format!(
        "SELECT {} FROM tasks WHERE user_id = $1 AND NOT is_completed AND due_date < NOW()",
        TASK_COLUMNS
    );
    let tasks = sqlx::query_as::<_, Task>(&sql)
        .bind(auth_user.id)
        .fetch_all(&**pool)
        .await?;

    Ok(HttpResponse::Ok().json(tasks))
}

/// Tasks carrying the given tag exactly.
#[get("/by-tag/{tag}")]
pub async fn get_tasks_by_tag(
    pool: web::Data<PgPool>,
    tag: web::Path<String>,
    auth_user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let sql = format!(
        "SELECT {} FROM tasks WHERE user_id = $1 AND $2 = ANY(tags)",
        TASK_COLUMNS
    );
    let tasks = sqlx::query_as::<_, Task>(&sql)
        .bind(auth_user.id)
        .bind(tag.into_inner())
        .fetch_all(&**pool)
        .await?;

    Ok(HttpResponse::Ok().json(tasks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TaskCategory, TaskPriority};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_filter_where_clause_owner_only() {
        let (clause, next) = filter_where_clause(&TaskFilter::default());
        assert_eq!(clause, "user_id = $1");
        assert_eq!(next, 2);
    }

    #[test]
    fn test_filter_where_clause_all_filters() {
        let filter = TaskFilter {
            completed: Some(false),
            priority: Some(TaskPriority::High),
            category: Some(TaskCategory::Work),
            due_date_from: Some(Utc::now()),
            due_date_to: Some(Utc::now()),
            search: Some("report".to_string()),
            tags: Some("home,office".to_string()),
            ..Default::default()
        };
        let (clause, next) = filter_where_clause(&filter);
        assert_eq!(
            clause,
            "user_id = $1 AND is_completed = $2 AND priority = $3 AND category = $4 \
             AND due_date >= $5 AND due_date <= $6 \
             AND (title ILIKE $7 OR description ILIKE $8) AND tags && $9"
        );
        assert_eq!(next, 10);
    }

    #[test]
    fn test_filter_where_clause_search_claims_two_placeholders() {
        let filter = TaskFilter {
            search: Some("milk".to_string()),
            ..Default::default()
        };
        let (clause, next) = filter_where_clause(&filter);
        assert_eq!(
            clause,
            "user_id = $1 AND (title ILIKE $2 OR description ILIKE $3)"
        );
        assert_eq!(next, 4);
    }

    #[test]
    fn test_filter_where_clause_ignores_blank_tags() {
        let filter = TaskFilter {
            tags: Some(" , ".to_string()),
            ..Default::default()
        };
        let (clause, next) = filter_where_clause(&filter);
        assert_eq!(clause, "user_id = $1");
        assert_eq!(next, 2);
    }

    #[test]
    fn test_update_set_clauses_empty_update_touches_timestamp() {
        let (sets, next) = update_set_clauses(&UpdateTaskRequest::default());
        assert_eq!(sets, vec!["updated_at = NOW()".to_string()]);
        assert_eq!(next, 1);
    }

    #[test]
    fn test_update_set_clauses_completion_toggle() {
        let complete = UpdateTaskRequest {
            is_completed: Some(true),
            ..Default::default()
        };
        let (sets, next) = update_set_clauses(&complete);
        assert!(sets.contains(&"is_completed = TRUE, completed_at = NOW()".to_string()));
        assert_eq!(next, 1);

        let uncomplete = UpdateTaskRequest {
            is_completed: Some(false),
            ..Default::default()
        };
        let (sets, _) = update_set_clauses(&uncomplete);
        assert!(sets.contains(&"is_completed = FALSE, completed_at = NULL".to_string()));
    }

    #[test]
    fn test_update_set_clauses_skips_empty_title() {
        let update = UpdateTaskRequest {
            title: Some("   ".to_string()),
            description: Some("new description".to_string()),
            ..Default::default()
        };
        let (sets, next) = update_set_clauses(&update);
        assert_eq!(
            sets,
            vec![
                "updated_at = NOW()".to_string(),
                "description = $1".to_string()
            ]
        );
        assert_eq!(next, 2);
    }

    #[test]
    fn test_update_set_clauses_full_update() {
        let update = UpdateTaskRequest {
            title: Some("New title".to_string()),
            description: Some("New description".to_string()),
            is_completed: Some(true),
            priority: Some(TaskPriority::Critical),
            category: Some(TaskCategory::Finance),
            due_date: Some(Utc::now()),
            tags: Some(vec!["a".to_string()]),
            estimated_hours: Some(1.0),
            actual_hours: Some(2.0),
        };
        let (sets, next) = update_set_clauses(&update);
        assert_eq!(
            sets,
            vec![
                "updated_at = NOW()".to_string(),
                "title = $1".to_string(),
                "description = $2".to_string(),
                "is_completed = TRUE, completed_at = NOW()".to_string(),
                "priority = $3".to_string(),
                "category = $4".to_string(),
                "due_date = $5".to_string(),
                "tags = $6".to_string(),
                "estimated_hours = $7".to_string(),
                "actual_hours = $8".to_string(),
            ]
        );
        assert_eq!(next, 9);
    }
}
