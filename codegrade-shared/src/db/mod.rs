/// Database layer for CodeGrade
///
/// - `pool`: PostgreSQL connection pool construction and health checks
/// - `migrations`: Embedded schema migrations (profiles, tasks, evaluations, payments)
///
/// Models live in the `models` module at the crate root.
///
/// # Example
///
/// ```no_run
/// use codegrade_shared::db::{migrations::run_migrations, pool::{create_pool, DatabaseConfig}};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = create_pool(DatabaseConfig::new(std::env::var("DATABASE_URL")?)).await?;
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
