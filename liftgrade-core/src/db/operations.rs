use anyhow::{Result, anyhow};
use chrono::Utc;
use diesel::prelude::*;
use diesel::sql_types::{Double, Integer};
use diesel::sqlite::SqliteConnection;

use crate::config::Multiplier;
use crate::db::models::{
    CompletedExercise, CompletedSet, CompletedWorkout, Exercise, ExerciseType,
    NewCompletedExercise, NewCompletedSet, NewCompletedWorkout, NewExercise, NewExerciseType,
    NewPrescription, NewWorkoutTemplate, Prescription, WorkoutTemplate,
};
use crate::db::schema::{
    completed_exercises, completed_sets, completed_workouts, exercise_types, exercises,
    workout_exercises, workout_templates,
};
use crate::grading::{GradeAverages, MultiplierTable, SetGrades};

// Exercise types
pub fn create_exercise_type(
    conn: &mut SqliteConnection,
    name: &str,
    multiplier: Multiplier,
) -> Result<ExerciseType> {
    diesel::insert_into(exercise_types::table)
        .values(&NewExerciseType {
            name,
            multiplier_min: multiplier.min,
            multiplier_max: multiplier.max,
        })
        .returning(ExerciseType::as_returning())
        .get_result(conn)
        .map_err(Into::into)
}

pub fn get_multiplier_table(conn: &mut SqliteConnection) -> Result<MultiplierTable> {
    let types = exercise_types::table
        .select(ExerciseType::as_select())
        .load(conn)?;
    Ok(types
        .into_iter()
        .map(|t| (t.id, Multiplier::new(t.multiplier_min, t.multiplier_max)))
        .collect())
}

// Exercises
pub fn get_or_create_exercise(
    conn: &mut SqliteConnection,
    name: &str,
    exercise_type_id: Option<i32>,
) -> Result<Exercise> {
    if let Some(exercise) = exercises::table
        .filter(exercises::name.eq(name))
        .select(Exercise::as_select())
        .first(conn)
        .optional()?
    {
        return Ok(exercise);
    }

    diesel::insert_into(exercises::table)
        .values(&NewExercise {
            name,
            exercise_type_id,
        })
        .returning(Exercise::as_returning())
        .get_result(conn)
        .map_err(Into::into)
}

pub fn get_all_exercises(conn: &mut SqliteConnection) -> Result<Vec<Exercise>> {
    exercises::table
        .select(Exercise::as_select())
        .order(exercises::id)
        .load(conn)
        .map_err(Into::into)
}

// Templates and prescriptions
pub fn create_workout_template(conn: &mut SqliteConnection, name: &str) -> Result<WorkoutTemplate> {
    diesel::insert_into(workout_templates::table)
        .values(&NewWorkoutTemplate { name })
        .returning(WorkoutTemplate::as_returning())
        .get_result(conn)
        .map_err(Into::into)
}

pub fn create_prescription(
    conn: &mut SqliteConnection,
    prescription: &NewPrescription,
) -> Result<Prescription> {
    diesel::insert_into(workout_exercises::table)
        .values(prescription)
        .returning(Prescription::as_returning())
        .get_result(conn)
        .map_err(Into::into)
}

pub fn get_prescriptions_for_template(
    conn: &mut SqliteConnection,
    template_id: i32,
) -> Result<Vec<Prescription>> {
    workout_exercises::table
        .filter(workout_exercises::workout_template_id.eq(template_id))
        .select(Prescription::as_select())
        .order(workout_exercises::id)
        .load(conn)
        .map_err(Into::into)
}

/// Prescription of `exercise_id` in the template `workout_id` was started from.
pub fn find_prescription_for_workout(
    conn: &mut SqliteConnection,
    workout_id: i32,
    exercise_id: i32,
) -> Result<Option<Prescription>> {
    let template_id: Option<i32> = completed_workouts::table
        .find(workout_id)
        .select(completed_workouts::workout_template_id)
        .first(conn)
        .optional()?
        .flatten();

    let Some(template_id) = template_id else {
        return Ok(None);
    };

    workout_exercises::table
        .filter(workout_exercises::workout_template_id.eq(template_id))
        .filter(workout_exercises::exercise_id.eq(exercise_id))
        .select(Prescription::as_select())
        .first(conn)
        .optional()
        .map_err(Into::into)
}

/// Overwrites weight and rep range; the goal range is only filled where unset.
pub fn update_prescription(
    conn: &mut SqliteConnection,
    prescription_id: i32,
    weight: f64,
    min_reps: i32,
    max_reps: i32,
) -> Result<()> {
    let updated = diesel::sql_query(
        "UPDATE workout_exercises \
         SET goal_weight = ?, min_reps = ?, max_reps = ?, \
             goal_min_reps = COALESCE(goal_min_reps, ?), \
             goal_max_reps = COALESCE(goal_max_reps, ?) \
         WHERE id = ?",
    )
    .bind::<Double, _>(weight)
    .bind::<Integer, _>(min_reps)
    .bind::<Integer, _>(max_reps)
    .bind::<Integer, _>(min_reps)
    .bind::<Integer, _>(max_reps)
    .bind::<Integer, _>(prescription_id)
    .execute(conn)?;

    if updated == 0 {
        return Err(anyhow!("prescription {} not found", prescription_id));
    }
    Ok(())
}

// Completed workouts
pub fn create_completed_workout(
    conn: &mut SqliteConnection,
    workout_template_id: Option<i32>,
) -> Result<CompletedWorkout> {
    diesel::insert_into(completed_workouts::table)
        .values(&NewCompletedWorkout {
            workout_template_id,
            start_time: Utc::now().timestamp(),
        })
        .returning(CompletedWorkout::as_returning())
        .get_result(conn)
        .map_err(Into::into)
}

pub fn get_completed_workout(
    conn: &mut SqliteConnection,
    workout_id: i32,
) -> Result<CompletedWorkout> {
    completed_workouts::table
        .find(workout_id)
        .select(CompletedWorkout::as_select())
        .first(conn)
        .map_err(|e| anyhow!("completed workout {}: {}", workout_id, e))
}

pub fn mark_workout_ended(conn: &mut SqliteConnection, workout_id: i32) -> Result<()> {
    let updated = diesel::update(completed_workouts::table.find(workout_id))
        .set(completed_workouts::end_time.eq(Some(Utc::now().timestamp())))
        .execute(conn)?;

    if updated == 0 {
        return Err(anyhow!("completed workout {} not found", workout_id));
    }
    Ok(())
}

pub fn update_workout_averages(
    conn: &mut SqliteConnection,
    workout_id: i32,
    averages: &GradeAverages,
) -> Result<()> {
    diesel::update(completed_workouts::table.find(workout_id))
        .set((
            completed_workouts::average_volume_grade.eq(Some(averages.average_volume)),
            completed_workouts::average_effort_grade.eq(Some(averages.average_effort)),
            completed_workouts::average_overall_grade.eq(Some(averages.average_overall)),
        ))
        .execute(conn)?;
    Ok(())
}

// Completed exercises
pub fn add_completed_exercise(
    conn: &mut SqliteConnection,
    completed_workout_id: i32,
    exercise_id: i32,
) -> Result<CompletedExercise> {
    diesel::insert_into(completed_exercises::table)
        .values(&NewCompletedExercise {
            completed_workout_id,
            exercise_id,
        })
        .returning(CompletedExercise::as_returning())
        .get_result(conn)
        .map_err(Into::into)
}

pub fn get_completed_exercises_for_workout(
    conn: &mut SqliteConnection,
    workout_id: i32,
) -> Result<Vec<CompletedExercise>> {
    completed_exercises::table
        .filter(completed_exercises::completed_workout_id.eq(workout_id))
        .select(CompletedExercise::as_select())
        .order(completed_exercises::id)
        .load(conn)
        .map_err(Into::into)
}

pub fn update_exercise_averages(
    conn: &mut SqliteConnection,
    completed_exercise_id: i32,
    averages: &GradeAverages,
) -> Result<()> {
    diesel::update(completed_exercises::table.find(completed_exercise_id))
        .set((
            completed_exercises::average_volume_grade.eq(Some(averages.average_volume)),
            completed_exercises::average_effort_grade.eq(Some(averages.average_effort)),
            completed_exercises::average_overall_grade.eq(Some(averages.average_overall)),
        ))
        .execute(conn)?;
    Ok(())
}

// Sets
pub fn add_completed_set(
    conn: &mut SqliteConnection,
    completed_exercise_id: i32,
    weight: f64,
    reps: i32,
    rpe: f64,
    rir: f64,
) -> Result<i32> {
    diesel::insert_into(completed_sets::table)
        .values(&NewCompletedSet {
            completed_exercise_id,
            weight,
            reps,
            rpe,
            rir,
        })
        .returning(completed_sets::id)
        .get_result(conn)
        .map_err(Into::into)
}

/// Every set of the workout with its exercise and exercise type, oldest first.
pub fn get_sets_for_workout(
    conn: &mut SqliteConnection,
    workout_id: i32,
) -> Result<Vec<CompletedSet>> {
    completed_sets::table
        .inner_join(completed_exercises::table.inner_join(exercises::table))
        .filter(completed_exercises::completed_workout_id.eq(workout_id))
        .select((
            completed_sets::id,
            completed_sets::completed_exercise_id,
            completed_exercises::exercise_id,
            exercises::exercise_type_id,
            completed_sets::weight,
            completed_sets::reps,
            completed_sets::rpe,
            completed_sets::rir,
            completed_sets::volume_grade,
            completed_sets::effort_grade,
            completed_sets::overall_grade,
        ))
        .order(completed_sets::id)
        .load::<CompletedSet>(conn)
        .map_err(Into::into)
}

pub fn update_set_grades(
    conn: &mut SqliteConnection,
    set_id: i32,
    grades: &SetGrades,
) -> Result<()> {
    diesel::update(completed_sets::table.find(set_id))
        .set((
            completed_sets::volume_grade.eq(Some(grades.volume)),
            completed_sets::effort_grade.eq(Some(grades.effort)),
            completed_sets::overall_grade.eq(Some(grades.overall)),
        ))
        .execute(conn)?;
    Ok(())
}
