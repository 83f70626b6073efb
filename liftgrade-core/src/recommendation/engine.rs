use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::ProgressionPolicy;
use crate::grading::round2;

/// Everything the policy is given about one exercise's latest performance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrescriptionInput {
    pub current_weight: f64,
    pub average_reps: f64,
    pub min_reps: i32,
    pub max_reps: i32,
    pub goal_min_reps: Option<i32>,
    pub goal_max_reps: Option<i32>,
    // Carried through for callers, not consulted by the decision.
    pub average_effort_grade: Option<f64>,
    pub average_rir: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    Overload,
    Deload,
    Progress,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub kind: AdjustmentKind,
    pub weight: f64,
    pub min_reps: i32,
    pub max_reps: i32,
}

/// Decides the next weight and rep range for an exercise.
///
/// Above the range the weight goes up and the range resets; below it the
/// weight drops and the range shrinks towards the deload floor; inside it the
/// goal range moves up one step.
pub fn adjust_prescription(input: &PrescriptionInput, policy: &ProgressionPolicy) -> Adjustment {
    let goal_min = input.goal_min_reps.unwrap_or(input.min_reps);
    let goal_max = input.goal_max_reps.unwrap_or(input.max_reps);

    let adjustment = if input.average_reps > f64::from(input.max_reps) {
        let overage = input.average_reps - f64::from(input.max_reps);
        Adjustment {
            kind: AdjustmentKind::Overload,
            weight: overload_weight(input.current_weight, overage, policy),
            min_reps: policy.overload_reset.min,
            max_reps: policy.overload_reset.max,
        }
    } else if input.average_reps < f64::from(input.min_reps) {
        Adjustment {
            kind: AdjustmentKind::Deload,
            weight: deload_weight(input.current_weight, policy),
            min_reps: policy.deload_floor.min.max(input.min_reps - policy.rep_step),
            max_reps: policy.deload_floor.max.max(input.max_reps - policy.rep_step),
        }
    } else {
        let max_reps = goal_max + policy.rep_step;
        Adjustment {
            kind: AdjustmentKind::Progress,
            weight: input.current_weight,
            min_reps: (goal_min + policy.rep_step).min(max_reps),
            max_reps,
        }
    };

    let adjustment = Adjustment {
        weight: round2(adjustment.weight),
        ..adjustment
    };
    debug!(
        "{:?} from {:.2}kg at {:.2} avg reps ({}-{}): {:.2}kg, {}-{} reps",
        adjustment.kind,
        input.current_weight,
        input.average_reps,
        input.min_reps,
        input.max_reps,
        adjustment.weight,
        adjustment.min_reps,
        adjustment.max_reps
    );
    adjustment
}

/// Percentage increase earned by beating the top of the range by `overage` reps.
pub fn overload_increase(overage: f64, policy: &ProgressionPolicy) -> f64 {
    if overage >= policy.small_overage && overage <= policy.small_overage_max {
        policy.small_increase
    } else if overage >= policy.large_overage {
        policy.large_increase
    } else {
        0.0
    }
}

fn plate_step(current_weight: f64, policy: &ProgressionPolicy) -> f64 {
    if current_weight <= policy.light_threshold {
        policy.light_step
    } else {
        policy.heavy_step
    }
}

/// `raw / step`, snapped to the nearest whole step when float error is all
/// that separates them, so 100 * 1.10 stays on 110 instead of rounding past it.
fn steps(raw: f64, step: f64) -> f64 {
    const SNAP: f64 = 1e-9;
    let count = raw / step;
    let whole = count.round();
    if (count - whole).abs() < SNAP { whole } else { count }
}

/// Increased weight, rounded up to the next loadable step.
pub fn overload_weight(current_weight: f64, overage: f64, policy: &ProgressionPolicy) -> f64 {
    let raw = current_weight * (1.0 + overload_increase(overage, policy));
    let step = plate_step(current_weight, policy);
    steps(raw, step).ceil() * step
}

/// Reduced weight, rounded down to the previous loadable step.
pub fn deload_weight(current_weight: f64, policy: &ProgressionPolicy) -> f64 {
    let raw = current_weight * policy.deload_factor;
    let step = plate_step(current_weight, policy);
    steps(raw, step).floor() * step
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(
        current_weight: f64,
        average_reps: f64,
        min_reps: i32,
        max_reps: i32,
    ) -> PrescriptionInput {
        PrescriptionInput {
            current_weight,
            average_reps,
            min_reps,
            max_reps,
            goal_min_reps: None,
            goal_max_reps: None,
            average_effort_grade: None,
            average_rir: None,
        }
    }

    #[test]
    fn overload_by_one_rep() {
        let adj = adjust_prescription(&input(100.0, 13.0, 8, 12), &ProgressionPolicy::default());
        assert_eq!(adj.kind, AdjustmentKind::Overload);
        assert_eq!(adj.weight, 105.0);
        assert_eq!((adj.min_reps, adj.max_reps), (8, 12));
    }

    #[test]
    fn overload_resets_any_goal_range() {
        let mut i = input(100.0, 13.0, 6, 10);
        i.goal_min_reps = Some(12);
        i.goal_max_reps = Some(16);
        let adj = adjust_prescription(&i, &ProgressionPolicy::default());
        // overage of 3 is still the small increase
        assert_eq!(adj.weight, 105.0);
        assert_eq!((adj.min_reps, adj.max_reps), (8, 12));
    }

    #[test]
    fn large_overage_adds_ten_percent() {
        let adj = adjust_prescription(&input(60.0, 16.0, 8, 12), &ProgressionPolicy::default());
        assert_eq!(adj.weight, 70.0);
    }

    #[test]
    fn ten_percent_landing_on_a_step_stays_there() {
        let policy = ProgressionPolicy::default();
        // 100 * 1.10 and 50 * 1.10 carry float error just above the step
        assert_eq!(overload_weight(100.0, 4.0, &policy), 110.0);
        assert_eq!(overload_weight(50.0, 4.0, &policy), 55.0);
        assert_eq!(overload_weight(200.0, 6.0, &policy), 220.0);
        assert_eq!(overload_weight(25.0, 4.0, &policy), 30.0);

        let adj = adjust_prescription(&input(100.0, 16.0, 8, 12), &policy);
        assert_eq!(adj.kind, AdjustmentKind::Overload);
        assert_eq!(adj.weight, 110.0);
    }

    #[test]
    fn deload_landing_on_a_step_stays_there() {
        let policy = ProgressionPolicy::default();
        assert_eq!(deload_weight(200.0, &policy), 195.0);
        assert_eq!(deload_weight(1000.0, &policy), 975.0);
    }

    #[test]
    fn fractional_overage_between_bands_keeps_weight() {
        let policy = ProgressionPolicy::default();
        assert_eq!(overload_increase(0.5, &policy), 0.0);
        assert_eq!(overload_increase(3.5, &policy), 0.0);
        assert_eq!(overload_increase(1.0, &policy), 0.05);
        assert_eq!(overload_increase(3.0, &policy), 0.05);
        assert_eq!(overload_increase(4.0, &policy), 0.10);

        let adj = adjust_prescription(&input(100.0, 12.5, 8, 12), &policy);
        assert_eq!(adj.kind, AdjustmentKind::Overload);
        assert_eq!(adj.weight, 100.0);
        assert_eq!((adj.min_reps, adj.max_reps), (8, 12));
    }

    #[test]
    fn light_weights_round_to_two_and_a_half() {
        let policy = ProgressionPolicy::default();
        // 12 * 1.05 = 12.6 -> 15.0
        assert_eq!(overload_weight(12.0, 2.0, &policy), 15.0);
        // 10 * 1.05 = 10.5 -> 12.5
        assert_eq!(overload_weight(10.0, 1.0, &policy), 12.5);
        // 18 * 0.975 = 17.55 -> 17.5
        assert_eq!(deload_weight(18.0, &policy), 17.5);
        // 20 is still light: 19.5 -> 17.5
        assert_eq!(deload_weight(20.0, &policy), 17.5);
    }

    #[test]
    fn deload_below_range() {
        let adj = adjust_prescription(&input(22.0, 5.0, 8, 12), &ProgressionPolicy::default());
        assert_eq!(adj.kind, AdjustmentKind::Deload);
        assert_eq!(adj.weight, 20.0);
        assert_eq!((adj.min_reps, adj.max_reps), (8, 12));
    }

    #[test]
    fn deload_shrinks_wide_range_to_floor() {
        let adj = adjust_prescription(&input(100.0, 9.0, 12, 16), &ProgressionPolicy::default());
        assert_eq!(adj.kind, AdjustmentKind::Deload);
        assert_eq!(adj.weight, 95.0);
        assert_eq!((adj.min_reps, adj.max_reps), (10, 14));

        let adj = adjust_prescription(&input(100.0, 9.0, 10, 13), &ProgressionPolicy::default());
        assert_eq!((adj.min_reps, adj.max_reps), (8, 12));
    }

    #[test]
    fn in_range_progresses_goal() {
        let mut i = input(50.0, 10.0, 8, 12);
        i.goal_min_reps = Some(8);
        i.goal_max_reps = Some(12);
        let adj = adjust_prescription(&i, &ProgressionPolicy::default());
        assert_eq!(adj.kind, AdjustmentKind::Progress);
        assert_eq!(adj.weight, 50.0);
        assert_eq!((adj.min_reps, adj.max_reps), (10, 14));
    }

    #[test]
    fn progress_falls_back_to_current_range() {
        let adj = adjust_prescription(&input(40.0, 11.0, 10, 14), &ProgressionPolicy::default());
        assert_eq!((adj.min_reps, adj.max_reps), (12, 16));
    }

    #[test]
    fn progress_caps_min_at_new_max() {
        let mut i = input(40.0, 10.0, 8, 12);
        i.goal_min_reps = Some(15);
        i.goal_max_reps = Some(12);
        let adj = adjust_prescription(&i, &ProgressionPolicy::default());
        assert_eq!((adj.min_reps, adj.max_reps), (14, 14));
    }

    #[test]
    fn boundaries_are_in_range() {
        let policy = ProgressionPolicy::default();
        assert_eq!(
            adjust_prescription(&input(50.0, 12.0, 8, 12), &policy).kind,
            AdjustmentKind::Progress
        );
        assert_eq!(
            adjust_prescription(&input(50.0, 8.0, 8, 12), &policy).kind,
            AdjustmentKind::Progress
        );
    }

    #[test]
    fn effort_inputs_do_not_change_the_decision() {
        let policy = ProgressionPolicy::default();
        let plain = input(80.0, 10.0, 8, 12);
        let mut with_effort = plain;
        with_effort.average_effort_grade = Some(0.95);
        with_effort.average_rir = Some(0.0);
        assert_eq!(
            adjust_prescription(&plain, &policy),
            adjust_prescription(&with_effort, &policy)
        );
    }

    #[test]
    fn weight_is_rounded_to_cents() {
        let adj = adjust_prescription(&input(42.123, 10.0, 8, 12), &ProgressionPolicy::default());
        assert_eq!(adj.weight, 42.12);
    }
}
