/// Database models for CodeGrade
///
/// Each model owns its SQL. Reads take a `&PgPool`; writes that must commit
/// together with other writes take a `&mut Transaction`.
///
/// # Models
///
/// - `profile`: per-user profile and subscription plan
/// - `task`: submitted coding exercises and their status machine
/// - `evaluation`: one AI evaluation per task
/// - `payment`: provider-confirmed report purchases
///
/// # Example
///
/// ```no_run
/// use codegrade_shared::models::profile::Profile;
/// use codegrade_shared::models::task::{Task, CreateTask};
/// use codegrade_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::new("postgresql://localhost/codegrade")).await?;
///
/// let profile = Profile::get_or_create(&pool, Uuid::new_v4(), "dev@example.com").await?;
/// let task = Task::create(&pool, CreateTask {
///     user_id: profile.id,
///     title: "Two Sum".to_string(),
///     description: "Return indices of two numbers adding up to target".to_string(),
///     code: None,
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod evaluation;
pub mod payment;
pub mod profile;
pub mod task;
