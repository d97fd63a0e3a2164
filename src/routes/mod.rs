pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::register)
            .service(auth::login)
            .service(auth::change_password)
            .service(auth::profile)
            .service(auth::validate_token)
            .service(auth::db_health),
    )
    .service(
        // Fixed-path routes must precede the `{id}` matchers.
        web::scope("/tasks")
            .service(tasks::get_stats)
            .service(tasks::get_tasks_due_today)
            .service(tasks::get_overdue_tasks)
            .service(tasks::get_tasks_by_tag)
            .service(tasks::get_tasks)
            .service(tasks::create_task)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task)
            .service(tasks::complete_task)
            .service(tasks::uncomplete_task),
    );
}
