pub mod errors;
pub mod logging;

use std::sync::OnceLock;

use log::{info, warn};
use tokio::sync::OnceCell;

use crate::completion::CompletionOutcome;
use crate::config::AdaptationConfig;
use crate::db::{self, DbPool};
use crate::runtime::bindings_runtime;
use errors::LiftgradeError;

static DB_POOL: OnceCell<DbPool> = OnceCell::const_new();
static ADAPTATION_CONFIG: OnceLock<AdaptationConfig> = OnceLock::new();

fn adaptation_config() -> AdaptationConfig {
    ADAPTATION_CONFIG.get().copied().unwrap_or_default()
}

/// Opens (creating if needed) the database at `path` and migrates it.
#[uniffi::export]
pub async fn setup_database(path: String) -> Result<(), LiftgradeError> {
    let runtime = bindings_runtime().await?;
    DB_POOL
        .get_or_try_init(move || async move {
            let pool = runtime
                .spawn_blocking(move || db::create_pool(&path))
                .await
                .map_err(LiftgradeError::database)?
                .map_err(|e| LiftgradeError::database(format!("{:#}", e)))?;
            info!("Database ready");
            Ok::<DbPool, LiftgradeError>(pool)
        })
        .await?;
    Ok(())
}

/// Overrides the default grading and progression settings. Only the first
/// call takes effect.
#[uniffi::export]
pub fn configure_adaptation(config_json: String) -> Result<bool, LiftgradeError> {
    let config = AdaptationConfig::from_json(&config_json)
        .map_err(|e| LiftgradeError::Config(format!("{:#}", e)))?;
    let applied = ADAPTATION_CONFIG.set(config).is_ok();
    if !applied {
        warn!("Adaptation config already set, ignoring");
    }
    Ok(applied)
}

/// Grades the finished workout and adjusts its template's prescriptions.
#[uniffi::export]
pub async fn complete_workout(workout_id: i32) -> CompletionOutcome {
    let Some(pool) = DB_POOL.get().cloned() else {
        return CompletionOutcome::failure(&anyhow::anyhow!("database is not set up"));
    };
    let runtime = match bindings_runtime().await {
        Ok(runtime) => runtime,
        Err(e) => return CompletionOutcome::failure(&e),
    };
    let config = adaptation_config();

    match runtime
        .spawn_blocking(move || db::complete_workout(&pool, workout_id, &config))
        .await
    {
        Ok((outcome, _)) => outcome,
        Err(e) => CompletionOutcome::failure(&anyhow::anyhow!(
            "completion task for workout {} failed: {}",
            workout_id,
            e
        )),
    }
}
