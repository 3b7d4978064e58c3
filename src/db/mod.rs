mod appointments;
mod blogs;
mod customers;
mod invoices;
mod milestones;
mod products;
mod quotes;
mod services;
mod submissions;
mod suppliers;
mod transactions;
mod users;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::Config;
use crate::error::Result;

pub use blogs::BlogRecord;
pub use invoices::NewInvoiceRecord;
pub use milestones::MilestoneDraft;
pub use quotes::NewQuoteRecord;
pub use transactions::DashboardStats;

/// Database connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new Database instance with a connection pool
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(config.database_url())
            .await?;

        Ok(Self { pool })
    }

    /// Build a pool that connects on first use.
    ///
    /// Lets the router be constructed (and request validation exercised)
    /// without a reachable database.
    pub fn connect_lazy(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_lazy(database_url)?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool, e.g. the per-test database `sqlx::test` hands out.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending migrations from `migrations/`.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Initialize the database connection pool
pub async fn init(config: &Config) -> Result<Database> {
    let db = Database::new(config).await?;
    tracing::info!(max_connections = config.db_max_connections, "database pool ready");
    Ok(db)
}
