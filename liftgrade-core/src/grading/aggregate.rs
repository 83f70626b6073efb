use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Anything carrying the three grade dimensions. Sets expose their raw
/// grades, exercises their stored averages.
pub trait GradeFields {
    fn volume(&self) -> Option<f64>;
    fn effort(&self) -> Option<f64>;
    fn overall(&self) -> Option<f64>;
}

impl<T: GradeFields + ?Sized> GradeFields for &T {
    fn volume(&self) -> Option<f64> {
        (**self).volume()
    }

    fn effort(&self) -> Option<f64> {
        (**self).effort()
    }

    fn overall(&self) -> Option<f64> {
        (**self).overall()
    }
}

/// Mean grades, rounded to two decimals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GradeAverages {
    pub average_volume: f64,
    pub average_effort: f64,
    pub average_overall: f64,
}

impl GradeFields for GradeAverages {
    fn volume(&self) -> Option<f64> {
        Some(self.average_volume)
    }

    fn effort(&self) -> Option<f64> {
        Some(self.average_effort)
    }

    fn overall(&self) -> Option<f64> {
        Some(self.average_overall)
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn numeric(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Averages each dimension over the items that carry all three as finite
/// numbers. Incomplete items are skipped with a warning; no valid items
/// gives all zeros.
pub fn average_grades<I>(items: I) -> GradeAverages
where
    I: IntoIterator,
    I::Item: GradeFields,
{
    let mut total = GradeAverages::default();
    let mut valid = 0usize;
    let mut invalid = 0usize;

    for (index, item) in items.into_iter().enumerate() {
        match (
            numeric(item.volume()),
            numeric(item.effort()),
            numeric(item.overall()),
        ) {
            (Some(volume), Some(effort), Some(overall)) => {
                total.average_volume += volume;
                total.average_effort += effort;
                total.average_overall += overall;
                valid += 1;
            }
            _ => {
                warn!("Skipping item {} with missing or non-numeric grades", index);
                invalid += 1;
            }
        }
    }

    if valid == 0 {
        debug!("No gradable items ({} invalid), averages are zero", invalid);
        return GradeAverages::default();
    }

    let count = valid as f64;
    let averages = GradeAverages {
        average_volume: round2(total.average_volume / count),
        average_effort: round2(total.average_effort / count),
        average_overall: round2(total.average_overall / count),
    };
    debug!(
        "Averaged {} items ({} skipped): {:?}",
        valid, invalid, averages
    );
    averages
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Item(Option<f64>, Option<f64>, Option<f64>);

    impl GradeFields for Item {
        fn volume(&self) -> Option<f64> {
            self.0
        }

        fn effort(&self) -> Option<f64> {
            self.1
        }

        fn overall(&self) -> Option<f64> {
            self.2
        }
    }

    fn full(v: f64, e: f64, o: f64) -> Item {
        Item(Some(v), Some(e), Some(o))
    }

    #[test]
    fn empty_is_zero() {
        let items: Vec<Item> = Vec::new();
        assert_eq!(average_grades(&items), GradeAverages::default());
    }

    #[test]
    fn all_invalid_is_zero() {
        let items = vec![Item(None, Some(1.0), Some(1.0)), Item(Some(f64::NAN), Some(1.0), Some(1.0))];
        assert_eq!(average_grades(&items), GradeAverages::default());
    }

    #[test]
    fn skips_items_missing_a_field() {
        let items = vec![
            full(100.0, 0.5, 200.0),
            Item(Some(1000.0), Some(1.0), None),
            full(300.0, 0.7, 400.0),
        ];
        let averages = average_grades(&items);
        assert_eq!(averages.average_volume, 200.0);
        assert_eq!(averages.average_effort, 0.6);
        assert_eq!(averages.average_overall, 300.0);
    }

    #[test]
    fn order_does_not_matter() {
        let forward = vec![full(10.0, 0.25, 7.5), full(20.0, 0.5, 12.5), full(33.0, 0.75, 1.0)];
        let reversed: Vec<&Item> = forward.iter().rev().collect();
        assert_eq!(average_grades(&forward), average_grades(reversed));
    }

    #[test]
    fn rounds_half_up_to_two_decimals() {
        let items = vec![
            full(1000.0, 0.8 * 0.8, 1440.0),
            full(800.0, 0.7 * 0.7, 952.0),
        ];
        let averages = average_grades(&items);
        assert_eq!(averages.average_volume, 900.0);
        assert_eq!(averages.average_effort, 0.57);
        assert_eq!(averages.average_overall, 1196.0);
    }

    #[test]
    fn averages_of_averages_are_mean_of_means() {
        // one exercise with many sets must not outweigh another with few
        let exercises = vec![
            GradeAverages {
                average_volume: 1000.0,
                average_effort: 0.8,
                average_overall: 1500.0,
            },
            GradeAverages {
                average_volume: 500.0,
                average_effort: 0.4,
                average_overall: 500.0,
            },
        ];
        let workout = average_grades(&exercises);
        assert_eq!(workout.average_volume, 750.0);
        assert_eq!(workout.average_effort, 0.6);
        assert_eq!(workout.average_overall, 1000.0);
    }

    #[test]
    fn round2_values() {
        assert_eq!(round2(0.5650000000000001), 0.57);
        assert_eq!(round2(2.0 / 3.0), 0.67);
        assert_eq!(round2(-1.234), -1.23);
    }
}
