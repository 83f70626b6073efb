//! Workout completion: grade every set, roll the grades up to exercises and
//! the workout, then move each exercise's prescription forward.
//!
//! The stages run strictly in order and each write goes through the
//! [`WorkoutRepository`] as soon as its value is known:
//!
//! 1. stamp the end time
//! 2. grade and save every set
//! 3. average and save every completed exercise
//! 4. average the exercise averages and save them on the workout
//! 5. adjust and save the prescription of every exercise performed
//!
//! A failing write aborts the run and leaves earlier writes in place.

mod repository;

#[cfg(test)]
mod memory;

pub use repository::{PrescriptionUpdate, WorkoutRepository};

use std::collections::HashMap;

use anyhow::{Context, Result};
use log::{debug, error, info};
use serde::Serialize;

use crate::config::AdaptationConfig;
use crate::db::models::CompletedSet;
use crate::grading::{GradeAverages, average_grades, grade_sets};
use crate::recommendation::{Adjustment, PrescriptionInput, adjust_prescription};

pub const SUCCESS_MESSAGE: &str = "Workout calculations completed successfully.";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExerciseAverages {
    pub completed_exercise_id: i32,
    pub averages: GradeAverages,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PrescriptionChange {
    pub exercise_id: i32,
    pub prescription_id: i32,
    pub previous_weight: f64,
    pub average_reps: f64,
    pub adjustment: Adjustment,
}

/// What one completion run computed and saved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionReport {
    pub workout_id: i32,
    pub sets_graded: usize,
    pub exercises: Vec<ExerciseAverages>,
    pub workout: GradeAverages,
    pub prescriptions: Vec<PrescriptionChange>,
    /// Exercises with no prescription in the workout's template.
    pub skipped_exercises: Vec<i32>,
}

/// Status handed back to whoever triggered the completion.
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionOutcome {
    pub success: bool,
    pub message: String,
}

impl CompletionOutcome {
    pub fn success() -> Self {
        Self {
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    pub fn failure(err: &anyhow::Error) -> Self {
        Self {
            success: false,
            message: format!("{:#}", err),
        }
    }

    pub fn from_result<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Self::success(),
            Err(e) => Self::failure(e),
        }
    }
}

/// Groups items by key, keeping keys in first-seen order.
fn group_by<'a, K, F>(sets: &'a [CompletedSet], key: F) -> Vec<(K, Vec<&'a CompletedSet>)>
where
    K: Copy + Eq + std::hash::Hash,
    F: Fn(&CompletedSet) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&CompletedSet>)> = Vec::new();
    for set in sets {
        let k = key(set);
        match index.get(&k) {
            Some(&i) => groups[i].1.push(set),
            None => {
                index.insert(k, groups.len());
                groups.push((k, vec![set]));
            }
        }
    }
    groups
}

fn mean<I: ExactSizeIterator<Item = f64>>(values: I) -> Option<f64> {
    let count = values.len();
    if count == 0 {
        return None;
    }
    Some(values.sum::<f64>() / count as f64)
}

/// Runs the whole completion pipeline for one workout.
pub fn complete_workout<R>(
    repo: &mut R,
    workout_id: i32,
    config: &AdaptationConfig,
) -> Result<CompletionReport>
where
    R: WorkoutRepository + ?Sized,
{
    info!("Completing workout {}", workout_id);

    repo.mark_workout_ended(workout_id)
        .with_context(|| format!("failed to mark workout {} as ended", workout_id))?;

    let mut sets = repo
        .load_sets(workout_id)
        .with_context(|| format!("failed to load sets for workout {}", workout_id))?;
    let multipliers = repo
        .load_multipliers()
        .context("failed to load exercise type multipliers")?;
    debug!(
        "Loaded {} sets and {} multipliers for workout {}",
        sets.len(),
        multipliers.len(),
        workout_id
    );

    grade_sets(&mut sets, &multipliers, config.defaults.multiplier);
    for set in &sets {
        if let Some(grades) = set.grades() {
            repo.save_set_grades(set.id, &grades)
                .with_context(|| format!("failed to save grades for set {}", set.id))?;
        }
    }

    let mut exercises = Vec::new();
    for (completed_exercise_id, group) in group_by(&sets, |s| s.completed_exercise_id) {
        let averages = average_grades(group);
        repo.save_exercise_averages(completed_exercise_id, &averages)
            .with_context(|| {
                format!(
                    "failed to save averages for completed exercise {}",
                    completed_exercise_id
                )
            })?;
        exercises.push(ExerciseAverages {
            completed_exercise_id,
            averages,
        });
    }

    let workout = average_grades(exercises.iter().map(|e| e.averages));
    repo.save_workout_averages(workout_id, &workout)
        .with_context(|| format!("failed to save averages for workout {}", workout_id))?;
    info!("Workout {} averages: {:?}", workout_id, workout);

    let mut prescriptions = Vec::new();
    let mut skipped_exercises = Vec::new();
    for (exercise_id, group) in group_by(&sets, |s| s.exercise_id) {
        let Some(row) = repo
            .find_prescription(workout_id, exercise_id)
            .with_context(|| format!("failed to look up prescription for exercise {}", exercise_id))?
        else {
            error!(
                "No prescription found for exercise {} in the template of workout {}",
                exercise_id, workout_id
            );
            skipped_exercises.push(exercise_id);
            continue;
        };

        let effective = config.defaults.resolve(&row);
        // groups are never empty, the last set is the most recent one
        let latest_weight = group.last().map(|s| s.weight).unwrap_or_default();
        let current_weight = effective.goal_weight.unwrap_or(latest_weight);
        let average_reps =
            mean(group.iter().map(|s| f64::from(s.reps))).unwrap_or_default();

        let input = PrescriptionInput {
            current_weight,
            average_reps,
            min_reps: effective.min_reps,
            max_reps: effective.max_reps,
            goal_min_reps: effective.goal_min_reps,
            goal_max_reps: effective.goal_max_reps,
            average_effort_grade: Some(average_grades(&group).average_effort),
            average_rir: mean(group.iter().map(|s| s.rir)),
        };
        let adjustment = adjust_prescription(&input, &config.policy);

        repo.save_prescription(&PrescriptionUpdate {
            prescription_id: row.id,
            weight: adjustment.weight,
            min_reps: adjustment.min_reps,
            max_reps: adjustment.max_reps,
        })
        .with_context(|| format!("failed to save prescription {}", row.id))?;

        prescriptions.push(PrescriptionChange {
            exercise_id,
            prescription_id: row.id,
            previous_weight: current_weight,
            average_reps,
            adjustment,
        });
    }

    info!(
        "Completed workout {}: {} sets graded, {} prescriptions adjusted, {} skipped",
        workout_id,
        sets.len(),
        prescriptions.len(),
        skipped_exercises.len()
    );

    Ok(CompletionReport {
        workout_id,
        sets_graded: sets.len(),
        exercises,
        workout,
        prescriptions,
        skipped_exercises,
    })
}

/// Entry point for one completion event: never fails, reports instead.
pub fn run_completion<R>(
    repo: &mut R,
    workout_id: i32,
    config: &AdaptationConfig,
) -> (CompletionOutcome, Option<CompletionReport>)
where
    R: WorkoutRepository + ?Sized,
{
    let result = complete_workout(repo, workout_id, config);
    let outcome = CompletionOutcome::from_result(&result);
    match result {
        Ok(report) => (outcome, Some(report)),
        Err(e) => {
            error!("Completing workout {} failed: {:#}", workout_id, e);
            (outcome, None)
        }
    }
}
