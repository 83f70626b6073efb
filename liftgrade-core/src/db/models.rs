use diesel::{Insertable, Queryable, Selectable};
use serde::Serialize;
use std::fmt;

use crate::db::schema;
use crate::grading::{GradeAverages, GradeFields, SetGrades};

// Exercise type models
#[derive(Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = schema::exercise_types)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExerciseType {
    pub id: i32,
    pub name: String,
    pub multiplier_min: f64,
    pub multiplier_max: f64,
}

#[derive(Insertable)]
#[diesel(table_name = schema::exercise_types)]
pub struct NewExerciseType<'a> {
    pub name: &'a str,
    pub multiplier_min: f64,
    pub multiplier_max: f64,
}

// Exercise models
#[derive(Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = schema::exercises)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Exercise {
    pub id: i32,
    pub name: String,
    pub exercise_type_id: Option<i32>,
}

#[derive(Insertable)]
#[diesel(table_name = schema::exercises)]
pub struct NewExercise<'a> {
    pub name: &'a str,
    pub exercise_type_id: Option<i32>,
}

// Template models
#[derive(Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = schema::workout_templates)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WorkoutTemplate {
    pub id: i32,
    pub name: String,
}

#[derive(Insertable)]
#[diesel(table_name = schema::workout_templates)]
pub struct NewWorkoutTemplate<'a> {
    pub name: &'a str,
}

/// Target weight and rep range for one exercise inside a template.
#[derive(Queryable, Selectable, Debug, Clone, PartialEq, Serialize)]
#[diesel(table_name = schema::workout_exercises)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Prescription {
    pub id: i32,
    pub workout_template_id: i32,
    pub exercise_id: i32,
    pub min_reps: Option<i32>,
    pub max_reps: Option<i32>,
    pub goal_min_reps: Option<i32>,
    pub goal_max_reps: Option<i32>,
    pub goal_weight: Option<f64>,
}

#[derive(Insertable, Default)]
#[diesel(table_name = schema::workout_exercises)]
pub struct NewPrescription {
    pub workout_template_id: i32,
    pub exercise_id: i32,
    pub min_reps: Option<i32>,
    pub max_reps: Option<i32>,
    pub goal_min_reps: Option<i32>,
    pub goal_max_reps: Option<i32>,
    pub goal_weight: Option<f64>,
}

impl fmt::Display for Prescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let weight = self
            .goal_weight
            .map(|w| format!("{:.2}", w))
            .unwrap_or_else(|| "-".to_string());
        let range = |lo: Option<i32>, hi: Option<i32>| match (lo, hi) {
            (Some(lo), Some(hi)) => format!("{}-{}", lo, hi),
            _ => "-".to_string(),
        };

        write!(
            f,
            "Exercise #{}: {} x {} reps (goal {})",
            self.exercise_id,
            weight,
            range(self.min_reps, self.max_reps),
            range(self.goal_min_reps, self.goal_max_reps)
        )
    }
}

// Completed workout models
#[derive(Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = schema::completed_workouts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CompletedWorkout {
    pub id: i32,
    pub workout_template_id: Option<i32>,
    pub start_time: i64,
    pub end_time: Option<i64>,
    pub average_volume_grade: Option<f64>,
    pub average_effort_grade: Option<f64>,
    pub average_overall_grade: Option<f64>,
}

#[derive(Insertable)]
#[diesel(table_name = schema::completed_workouts)]
pub struct NewCompletedWorkout {
    pub workout_template_id: Option<i32>,
    pub start_time: i64,
}

#[derive(Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = schema::completed_exercises)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CompletedExercise {
    pub id: i32,
    pub completed_workout_id: i32,
    pub exercise_id: i32,
    pub average_volume_grade: Option<f64>,
    pub average_effort_grade: Option<f64>,
    pub average_overall_grade: Option<f64>,
}

#[derive(Insertable)]
#[diesel(table_name = schema::completed_exercises)]
pub struct NewCompletedExercise {
    pub completed_workout_id: i32,
    pub exercise_id: i32,
}

impl CompletedExercise {
    /// Stored averages, `None` until the exercise has been aggregated.
    pub fn averages(&self) -> Option<GradeAverages> {
        Some(GradeAverages {
            average_volume: self.average_volume_grade?,
            average_effort: self.average_effort_grade?,
            average_overall: self.average_overall_grade?,
        })
    }
}

impl GradeFields for CompletedExercise {
    fn volume(&self) -> Option<f64> {
        self.average_volume_grade
    }

    fn effort(&self) -> Option<f64> {
        self.average_effort_grade
    }

    fn overall(&self) -> Option<f64> {
        self.average_overall_grade
    }
}

// Set models

/// One recorded set joined with the ids grading and adaptation need.
///
/// Grade fields stay `None` until the set has been graded.
#[derive(Queryable, Debug, Clone, PartialEq)]
pub struct CompletedSet {
    pub id: i32,
    pub completed_exercise_id: i32,
    pub exercise_id: i32,
    pub exercise_type_id: Option<i32>,
    pub weight: f64,
    pub reps: i32,
    pub rpe: f64,
    pub rir: f64,
    pub volume_grade: Option<f64>,
    pub effort_grade: Option<f64>,
    pub overall_grade: Option<f64>,
}

impl CompletedSet {
    pub fn grades(&self) -> Option<SetGrades> {
        Some(SetGrades {
            volume: self.volume_grade?,
            effort: self.effort_grade?,
            overall: self.overall_grade?,
        })
    }

    pub fn apply_grades(&mut self, grades: SetGrades) {
        self.volume_grade = Some(grades.volume);
        self.effort_grade = Some(grades.effort);
        self.overall_grade = Some(grades.overall);
    }
}

impl GradeFields for CompletedSet {
    fn volume(&self) -> Option<f64> {
        self.volume_grade
    }

    fn effort(&self) -> Option<f64> {
        self.effort_grade
    }

    fn overall(&self) -> Option<f64> {
        self.overall_grade
    }
}

impl fmt::Display for CompletedSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Exercise #{}: {:.1}kg x {} reps @{:.1} RPE, {:.1} RIR",
            self.exercise_id, self.weight, self.reps, self.rpe, self.rir
        )?;
        if let Some(grades) = self.grades() {
            write!(f, " | {}", grades)?;
        }
        Ok(())
    }
}

#[derive(Insertable)]
#[diesel(table_name = schema::completed_sets)]
pub struct NewCompletedSet {
    pub completed_exercise_id: i32,
    pub weight: f64,
    pub reps: i32,
    pub rpe: f64,
    pub rir: f64,
}
