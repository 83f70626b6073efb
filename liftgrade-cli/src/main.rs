use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use log::{LevelFilter, debug, info};

use liftgrade::completion::CompletionOutcome;
use liftgrade::config::{AdaptationConfig, Multiplier, Settings};
use liftgrade::db::models::NewPrescription;
use liftgrade::db::{self, DbPool, operations};
use liftgrade::logging::{init_stderr_logger, parse_level};

#[derive(Parser, Debug)]
#[command(version, about = "Liftgrade - workout grading and progression", long_about = None)]
struct Args {
    /// SQLite database path, defaults to $DATABASE_URL
    #[arg(long, global = true)]
    database: Option<String>,

    /// JSON file overriding grading and progression defaults, defaults to $LIFTGRADE_CONFIG
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// off, error, warn, info, debug or trace, defaults to $LIFTGRADE_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create or upgrade the database schema
    Migrate,
    /// Insert a demo template and a finished workout to try `complete` on
    SeedDemo,
    /// Grade a finished workout and adjust its template's prescriptions
    Complete {
        workout_id: i32,
        /// Print the response body as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the stored grades of a workout and its template's prescriptions
    Show { workout_id: i32 },
}

fn seed_demo(pool: &DbPool) -> Result<i32> {
    let mut conn = pool.get()?;

    let compound = operations::create_exercise_type(&mut conn, "compound", Multiplier::new(1.0, 1.2))?;
    let isolation =
        operations::create_exercise_type(&mut conn, "isolation", Multiplier::new(0.6, 0.8))?;
    let bench = operations::get_or_create_exercise(&mut conn, "Bench Press", Some(compound.id))?;
    let fly = operations::get_or_create_exercise(&mut conn, "Cable Fly", Some(isolation.id))?;
    let template = operations::create_workout_template(&mut conn, "Push Day")?;

    operations::create_prescription(
        &mut conn,
        &NewPrescription {
            workout_template_id: template.id,
            exercise_id: bench.id,
            min_reps: Some(8),
            max_reps: Some(12),
            goal_weight: Some(80.0),
            ..Default::default()
        },
    )?;
    operations::create_prescription(
        &mut conn,
        &NewPrescription {
            workout_template_id: template.id,
            exercise_id: fly.id,
            ..Default::default()
        },
    )?;

    let workout = operations::create_completed_workout(&mut conn, Some(template.id))?;
    let bench_done = operations::add_completed_exercise(&mut conn, workout.id, bench.id)?;
    for (weight, reps, rpe, rir) in [(80.0, 14, 7.0, 3.0), (80.0, 13, 8.0, 2.0), (80.0, 13, 9.0, 1.0)] {
        operations::add_completed_set(&mut conn, bench_done.id, weight, reps, rpe, rir)?;
    }
    let fly_done = operations::add_completed_exercise(&mut conn, workout.id, fly.id)?;
    for (weight, reps, rpe, rir) in [(15.0, 6, 9.0, 1.0), (15.0, 5, 10.0, 0.0)] {
        operations::add_completed_set(&mut conn, fly_done.id, weight, reps, rpe, rir)?;
    }

    info!("Seeded demo workout {}", workout.id);
    Ok(workout.id)
}

fn show_workout(pool: &DbPool, workout_id: i32) -> Result<()> {
    let mut conn = pool.get()?;
    let workout = operations::get_completed_workout(&mut conn, workout_id)?;
    let names: HashMap<i32, String> = operations::get_all_exercises(&mut conn)?
        .into_iter()
        .map(|e| (e.id, e.name))
        .collect();
    let name = |id: i32| names.get(&id).cloned().unwrap_or_else(|| format!("Exercise #{}", id));
    let grade = |v: Option<f64>| v.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".into());

    println!(
        "Workout #{} | volume {} | effort {} | overall {}{}",
        workout.id,
        grade(workout.average_volume_grade),
        grade(workout.average_effort_grade),
        grade(workout.average_overall_grade),
        if workout.end_time.is_some() { "" } else { " (not completed)" }
    );

    let sets = operations::get_sets_for_workout(&mut conn, workout_id)?;
    for exercise in operations::get_completed_exercises_for_workout(&mut conn, workout_id)? {
        println!(
            "  {} | volume {} | effort {} | overall {}",
            name(exercise.exercise_id),
            grade(exercise.average_volume_grade),
            grade(exercise.average_effort_grade),
            grade(exercise.average_overall_grade)
        );
        for set in sets.iter().filter(|s| s.completed_exercise_id == exercise.id) {
            println!("    {}", set);
        }
    }

    if let Some(template_id) = workout.workout_template_id {
        println!("Prescriptions:");
        for row in operations::get_prescriptions_for_template(&mut conn, template_id)? {
            println!("  {} ({})", row, name(row.exercise_id));
        }
    }
    Ok(())
}

fn print_outcome(outcome: &CompletionOutcome, json: bool) {
    if json {
        let body = if outcome.success {
            serde_json::json!({ "message": outcome.message })
        } else {
            serde_json::json!({ "error": "Internal Server Error", "message": outcome.message })
        };
        println!("{}", body);
    } else if outcome.success {
        println!("{}", outcome.message);
    } else {
        eprintln!("Error: {}", outcome.message);
    }
}

async fn run(args: Args, settings: Settings) -> Result<ExitCode> {
    let database = args
        .database
        .or(settings.database_url)
        .ok_or_else(|| anyhow!("DATABASE_URL must be specified or passed with --database"))?;
    let config_path = args.config.or(settings.config_path);
    let config = AdaptationConfig::load_or_default(config_path.as_deref())?;
    debug!("Using database {}", database);

    let pool = db::create_pool(&database)?;

    match args.command {
        Commands::Migrate => {
            println!("Database {} is up to date", database);
        }
        Commands::SeedDemo => {
            let workout_id = seed_demo(&pool)?;
            println!("Created demo workout {}", workout_id);
        }
        Commands::Complete { workout_id, json } => {
            let (outcome, report) = db::complete_workout_async(pool, workout_id, config).await;
            print_outcome(&outcome, json);
            if let Some(report) = report {
                if !json {
                    for change in &report.prescriptions {
                        println!(
                            "  exercise #{}: {:?} {:.2} -> {:.2}, {}-{} reps",
                            change.exercise_id,
                            change.adjustment.kind,
                            change.previous_weight,
                            change.adjustment.weight,
                            change.adjustment.min_reps,
                            change.adjustment.max_reps
                        );
                    }
                }
            }
            if !outcome.success {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Show { workout_id } => show_workout(&pool, workout_id)?,
    }

    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    let args = Args::parse();
    let settings = Settings::from_env();

    let level = args
        .log_level
        .as_deref()
        .or(settings.log_level.as_deref())
        .and_then(parse_level)
        .unwrap_or(LevelFilter::Info);
    init_stderr_logger(level);

    match run(args, settings).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
