use diesel::connection::SimpleConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use rocket::fairing::AdHoc;
use rocket_sync_db_pools::{database, diesel};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[database("sqlite_db")]
pub struct DbConn(diesel::SqliteConnection);

/// Abstracts over `DbConn` and the test wrapper so ORM helpers that need an
/// async `.run()` work against both.
pub trait DbRunner {
    fn run<F, R>(&self, f: F) -> impl std::future::Future<Output = R>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static;
}

impl DbRunner for DbConn {
    fn run<F, R>(&self, f: F) -> impl std::future::Future<Output = R>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        DbConn::run(self, f)
    }
}

/// Enables foreign key support for SQLite connections.
///
/// Foreign keys are disabled by default in SQLite for backwards
/// compatibility; the `ON DELETE` rules in the migrations depend on them.
pub fn set_foreign_keys(conn: &mut diesel::SqliteConnection) -> diesel::QueryResult<()> {
    conn.batch_execute("PRAGMA foreign_keys = ON")
}

/// Creates a Rocket fairing that enables foreign key support on ignition.
///
/// The pragma is per connection and this only reaches the one handed out
/// at ignition, so deletes clear and cascade their references themselves.
pub fn set_foreign_keys_fairing() -> AdHoc {
    AdHoc::try_on_ignite("Set Foreign Keys", |rocket| async {
        let Some(conn) = DbConn::get_one(&rocket).await else {
            error!("No database connection available to enable foreign keys");
            return Err(rocket);
        };
        match conn.run(set_foreign_keys).await {
            Ok(()) => Ok(rocket),
            Err(e) => {
                error!("Failed to enable foreign keys: {}", e);
                Err(rocket)
            }
        }
    })
}

/// Runs all pending database migrations on the provided connection.
pub fn run_pending_migrations(
    conn: &mut diesel::SqliteConnection,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    conn.run_pending_migrations(MIGRATIONS)?;
    Ok(())
}

/// Creates a Rocket fairing that runs database migrations on ignition.
pub fn run_migrations_fairing() -> AdHoc {
    AdHoc::try_on_ignite("Diesel Migrations", |rocket| async {
        let Some(conn) = DbConn::get_one(&rocket).await else {
            error!("No database connection available for migrations");
            return Err(rocket);
        };
        match conn.run(|c| run_pending_migrations(c).map_err(|e| e.to_string())).await {
            Ok(()) => Ok(rocket),
            Err(e) => {
                error!("Failed to run migrations: {}", e);
                Err(rocket)
            }
        }
    })
}
