//! Storage port for workout completion.

use anyhow::Result;

use crate::db::models::{CompletedSet, Prescription};
use crate::grading::{GradeAverages, MultiplierTable, SetGrades};

/// New weight and rep range for a prescription row.
///
/// `min_reps`/`max_reps` overwrite the stored values; the goal range is only
/// filled in where the row has none yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrescriptionUpdate {
    pub prescription_id: i32,
    pub weight: f64,
    pub min_reps: i32,
    pub max_reps: i32,
}

/// Everything the completion pipeline reads from and writes to storage.
///
/// Every save is its own unit of work. Implementations must not roll back
/// earlier saves when a later one fails.
pub trait WorkoutRepository {
    /// Stamp the workout's end time. Fails if the workout does not exist.
    fn mark_workout_ended(&mut self, workout_id: i32) -> Result<()>;

    /// All sets of the workout, oldest first.
    fn load_sets(&mut self, workout_id: i32) -> Result<Vec<CompletedSet>>;

    fn load_multipliers(&mut self) -> Result<MultiplierTable>;

    /// The prescription for `exercise_id` in the template the workout was started from.
    fn find_prescription(
        &mut self,
        workout_id: i32,
        exercise_id: i32,
    ) -> Result<Option<Prescription>>;

    fn save_set_grades(&mut self, set_id: i32, grades: &SetGrades) -> Result<()>;

    fn save_exercise_averages(
        &mut self,
        completed_exercise_id: i32,
        averages: &GradeAverages,
    ) -> Result<()>;

    fn save_workout_averages(&mut self, workout_id: i32, averages: &GradeAverages) -> Result<()>;

    fn save_prescription(&mut self, update: &PrescriptionUpdate) -> Result<()>;
}
