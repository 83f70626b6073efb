//! Per-set grading and the averaging that rolls grades up to exercises and
//! workouts.

mod aggregate;

pub use aggregate::{GradeAverages, GradeFields, average_grades, round2};

use std::collections::HashMap;
use std::fmt;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::config::Multiplier;
use crate::db::models::CompletedSet;

/// Exercise type id to multiplier pair.
pub type MultiplierTable = HashMap<i32, Multiplier>;

/// The three grade dimensions of one set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SetGrades {
    pub volume: f64,
    pub effort: f64,
    pub overall: f64,
}

impl fmt::Display for SetGrades {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "volume {:.2}, effort {:.2}, overall {:.2}",
            self.volume, self.effort, self.overall
        )
    }
}

/// Grades a single performance. rpe and rir are taken as given, so values
/// outside 0..=10 produce out-of-range grades.
pub fn grade(weight: f64, reps: i32, rpe: f64, rir: f64, multiplier: Multiplier) -> SetGrades {
    let m = multiplier.midpoint();
    let intensity = rpe / 10.0;
    let reserve = 1.0 - rir / 10.0;

    let volume = weight * f64::from(reps) * m;
    let effort = intensity * reserve * m;
    let overall = volume * (1.0 + intensity) * reserve * m;

    SetGrades {
        volume,
        effort,
        overall,
    }
}

pub fn grade_set(set: &CompletedSet, multiplier: Multiplier) -> SetGrades {
    grade(set.weight, set.reps, set.rpe, set.rir, multiplier)
}

/// Attaches grades to every set in place. Exercise types missing from
/// `multipliers` (or sets without a type) use `fallback`.
pub fn grade_sets(
    sets: &mut [CompletedSet],
    multipliers: &MultiplierTable,
    fallback: Multiplier,
) {
    for set in sets.iter_mut() {
        let multiplier = set
            .exercise_type_id
            .and_then(|type_id| multipliers.get(&type_id).copied())
            .unwrap_or(fallback);
        let grades = grade_set(set, multiplier);
        trace!("Graded set {}: {}", set.id, grades);
        set.apply_grades(grades);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn set(
        id: i32,
        completed_exercise_id: i32,
        weight: f64,
        reps: i32,
        rpe: f64,
        rir: f64,
    ) -> CompletedSet {
        CompletedSet {
            id,
            completed_exercise_id,
            exercise_id: completed_exercise_id,
            exercise_type_id: None,
            weight,
            reps,
            rpe,
            rir,
            volume_grade: None,
            effort_grade: None,
            overall_grade: None,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn equal_multiplier_identities() {
        for m in [0.5, 1.0, 1.5, 2.0] {
            let g = grade(80.0, 6, 9.0, 1.0, Multiplier::new(m, m));
            assert_eq!(g.volume, 80.0 * 6.0 * m);
            assert!(close(g.overall, 80.0 * 6.0 * m * 1.9 * 0.9 * m));
            assert!(close(g.effort, 0.9 * 0.9 * m));
        }
    }

    #[test]
    fn grades_two_sets_with_neutral_multiplier() {
        let mut sets = vec![set(1, 1, 100.0, 10, 8.0, 2.0), set(2, 1, 100.0, 8, 7.0, 3.0)];
        grade_sets(&mut sets, &MultiplierTable::new(), Multiplier::NEUTRAL);

        let first = sets[0].grades().unwrap();
        let second = sets[1].grades().unwrap();
        assert_eq!(first.volume, 1000.0);
        assert_eq!(second.volume, 800.0);
        assert!(close(first.effort, 0.64));
        assert!(close(second.effort, 0.49));
        assert!(close(first.overall, 1440.0));
        assert!(close(second.overall, 952.0));
    }

    #[test]
    fn uses_type_multiplier_midpoint() {
        let mut sets = vec![set(1, 1, 50.0, 10, 10.0, 0.0), set(2, 1, 50.0, 10, 10.0, 0.0)];
        sets[0].exercise_type_id = Some(7);
        sets[1].exercise_type_id = Some(99);
        let table = MultiplierTable::from([(7, Multiplier::new(1.0, 2.0))]);

        grade_sets(&mut sets, &table, Multiplier::NEUTRAL);

        assert_eq!(sets[0].volume_grade, Some(750.0));
        assert_eq!(sets[0].effort_grade, Some(1.5));
        // unknown type falls back to the neutral pair
        assert_eq!(sets[1].volume_grade, Some(500.0));
        assert_eq!(sets[1].effort_grade, Some(1.0));
    }

    #[test]
    fn out_of_range_effort_is_not_clamped() {
        let g = grade(100.0, 5, 8.0, 12.0, Multiplier::NEUTRAL);
        assert!(g.effort < 0.0);
        assert!(g.overall < 0.0);

        let g = grade(100.0, 5, 12.0, 0.0, Multiplier::NEUTRAL);
        assert!(g.effort > 1.0);
    }

    #[test]
    fn zero_reps_grade_zero_volume() {
        let g = grade(100.0, 0, 8.0, 2.0, Multiplier::NEUTRAL);
        assert_eq!(g.volume, 0.0);
        assert_eq!(g.overall, 0.0);
        assert!(close(g.effort, 0.64));
    }
}
