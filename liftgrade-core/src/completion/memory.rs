//! In-memory repository used by the completion tests.

use std::collections::HashMap;

use anyhow::{Result, anyhow};

use super::{PrescriptionUpdate, WorkoutRepository};
use crate::db::models::{CompletedSet, Prescription};
use crate::grading::{GradeAverages, MultiplierTable, SetGrades};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Write {
    Ended(i32),
    SetGrades(i32),
    ExerciseAverages(i32),
    WorkoutAverages(i32),
    Prescription(i32),
}

#[derive(Default)]
pub struct MemoryRepository {
    pub workout_id: i32,
    pub ended: bool,
    pub sets: Vec<CompletedSet>,
    pub multipliers: MultiplierTable,
    pub prescriptions: Vec<Prescription>,
    pub set_grades: HashMap<i32, SetGrades>,
    pub exercise_averages: HashMap<i32, GradeAverages>,
    pub workout_averages: Option<GradeAverages>,
    pub prescription_updates: Vec<PrescriptionUpdate>,
    pub log: Vec<Write>,
    pub fail_on: Option<Write>,
}

impl MemoryRepository {
    pub fn new(workout_id: i32) -> Self {
        Self {
            workout_id,
            ..Default::default()
        }
    }

    fn record(&mut self, write: Write) -> Result<()> {
        if self.fail_on == Some(write) {
            return Err(anyhow!("injected failure"));
        }
        self.log.push(write);
        Ok(())
    }
}

impl WorkoutRepository for MemoryRepository {
    fn mark_workout_ended(&mut self, workout_id: i32) -> Result<()> {
        if workout_id != self.workout_id {
            return Err(anyhow!("completed workout {} not found", workout_id));
        }
        self.record(Write::Ended(workout_id))?;
        self.ended = true;
        Ok(())
    }

    fn load_sets(&mut self, _workout_id: i32) -> Result<Vec<CompletedSet>> {
        Ok(self.sets.clone())
    }

    fn load_multipliers(&mut self) -> Result<MultiplierTable> {
        Ok(self.multipliers.clone())
    }

    fn find_prescription(
        &mut self,
        _workout_id: i32,
        exercise_id: i32,
    ) -> Result<Option<Prescription>> {
        Ok(self
            .prescriptions
            .iter()
            .find(|p| p.exercise_id == exercise_id)
            .cloned())
    }

    fn save_set_grades(&mut self, set_id: i32, grades: &SetGrades) -> Result<()> {
        self.record(Write::SetGrades(set_id))?;
        self.set_grades.insert(set_id, *grades);
        Ok(())
    }

    fn save_exercise_averages(
        &mut self,
        completed_exercise_id: i32,
        averages: &GradeAverages,
    ) -> Result<()> {
        self.record(Write::ExerciseAverages(completed_exercise_id))?;
        self.exercise_averages
            .insert(completed_exercise_id, *averages);
        Ok(())
    }

    fn save_workout_averages(&mut self, workout_id: i32, averages: &GradeAverages) -> Result<()> {
        self.record(Write::WorkoutAverages(workout_id))?;
        self.workout_averages = Some(*averages);
        Ok(())
    }

    fn save_prescription(&mut self, update: &PrescriptionUpdate) -> Result<()> {
        self.record(Write::Prescription(update.prescription_id))?;
        self.prescription_updates.push(*update);
        Ok(())
    }
}
