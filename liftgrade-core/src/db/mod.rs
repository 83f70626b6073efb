pub mod models;
pub mod operations;
pub mod schema;

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use log::{debug, error, info};

use crate::completion::{
    CompletionOutcome, CompletionReport, PrescriptionUpdate, WorkoutRepository, run_completion,
};
use crate::config::AdaptationConfig;
use crate::db::models::{CompletedSet, Prescription};
use crate::grading::{GradeAverages, MultiplierTable, SetGrades};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Debug, Clone, Copy)]
struct ConnectionOptions {
    busy_timeout: Duration,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {};",
            self.busy_timeout.as_millis()
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Builds a connection pool for `database_url` and brings the schema up to date.
pub fn create_pool(database_url: &str) -> Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder()
        .connection_customizer(Box::new(ConnectionOptions {
            busy_timeout: Duration::from_millis(5000),
        }))
        .build(manager)
        .with_context(|| format!("Failed to create DB pool for {}", database_url))?;

    let mut conn = pool.get()?;
    init_database(&mut conn)?;
    Ok(pool)
}

pub fn init_database(conn: &mut SqliteConnection) -> Result<()> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow!("Failed to run migrations: {}", e))?;
    if applied.is_empty() {
        debug!("Database schema is up to date");
    }
    for migration in applied {
        info!("Applied migration {}", migration);
    }
    Ok(())
}

/// [`WorkoutRepository`] over a SQLite connection.
pub struct SqliteRepository<'a> {
    conn: &'a mut SqliteConnection,
}

impl<'a> SqliteRepository<'a> {
    pub fn new(conn: &'a mut SqliteConnection) -> Self {
        Self { conn }
    }
}

impl WorkoutRepository for SqliteRepository<'_> {
    fn mark_workout_ended(&mut self, workout_id: i32) -> Result<()> {
        operations::mark_workout_ended(self.conn, workout_id)
    }

    fn load_sets(&mut self, workout_id: i32) -> Result<Vec<CompletedSet>> {
        operations::get_sets_for_workout(self.conn, workout_id)
    }

    fn load_multipliers(&mut self) -> Result<MultiplierTable> {
        operations::get_multiplier_table(self.conn)
    }

    fn find_prescription(
        &mut self,
        workout_id: i32,
        exercise_id: i32,
    ) -> Result<Option<Prescription>> {
        operations::find_prescription_for_workout(self.conn, workout_id, exercise_id)
    }

    fn save_set_grades(&mut self, set_id: i32, grades: &SetGrades) -> Result<()> {
        operations::update_set_grades(self.conn, set_id, grades)
    }

    fn save_exercise_averages(
        &mut self,
        completed_exercise_id: i32,
        averages: &GradeAverages,
    ) -> Result<()> {
        operations::update_exercise_averages(self.conn, completed_exercise_id, averages)
    }

    fn save_workout_averages(&mut self, workout_id: i32, averages: &GradeAverages) -> Result<()> {
        operations::update_workout_averages(self.conn, workout_id, averages)
    }

    fn save_prescription(&mut self, update: &PrescriptionUpdate) -> Result<()> {
        operations::update_prescription(
            self.conn,
            update.prescription_id,
            update.weight,
            update.min_reps,
            update.max_reps,
        )
    }
}

/// Processes one completion event against the pool. The pooled connection
/// goes back to the pool on every path out of this function.
pub fn complete_workout(
    pool: &DbPool,
    workout_id: i32,
    config: &AdaptationConfig,
) -> (CompletionOutcome, Option<CompletionReport>) {
    let mut conn = match pool.get() {
        Ok(conn) => conn,
        Err(e) => {
            let err = anyhow::Error::new(e).context("Failed to get a database connection");
            error!("{:#}", err);
            return (CompletionOutcome::failure(&err), None);
        }
    };
    let mut repo = SqliteRepository::new(&mut conn);
    run_completion(&mut repo, workout_id, config)
}

/// [`complete_workout`] on tokio's blocking pool.
pub async fn complete_workout_async(
    pool: DbPool,
    workout_id: i32,
    config: AdaptationConfig,
) -> (CompletionOutcome, Option<CompletionReport>) {
    match tokio::task::spawn_blocking(move || complete_workout(&pool, workout_id, &config)).await {
        Ok(result) => result,
        Err(e) => {
            let err = anyhow!("completion task for workout {} failed: {}", workout_id, e);
            error!("{}", err);
            (CompletionOutcome::failure(&err), None)
        }
    }
}
