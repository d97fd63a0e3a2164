pub mod page;
pub mod task;
pub mod user;

pub use page::PagedResult;
pub use task::{
    compute_stats, CreateTaskRequest, Task, TaskCategory, TaskFilter, TaskPriority, TaskStats,
    UpdateTaskRequest,
};
pub use user::{User, UserProfile};
