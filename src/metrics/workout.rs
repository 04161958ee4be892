//! Workout statistics
//!
//! Volume, weekly frequency, average duration, streaks and milestone
//! achievements. Every store computes its stats through these functions so the
//! results cannot drift between backends.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{WorkoutSet, WorkoutWithExercises};

/// Length of the "this week" window, in days
pub const WEEK_DAYS: i64 = 7;

/// Aggregate workout statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutStats {
    /// Workouts dated within the last seven days
    pub weekly_workouts: i64,
    /// Total lifted volume over completed sets
    #[serde(with = "rust_decimal::serde::float")]
    pub total_weight: Decimal,
    /// Mean duration in whole minutes over workouts that recorded one
    pub avg_duration: i64,
}

/// Volume of one set: `weight × reps` when completed with both recorded.
/// Saturates at [`Decimal::MAX`] rather than overflowing.
pub fn set_volume(set: &WorkoutSet) -> Decimal {
    match (set.completed, set.weight, set.reps) {
        (true, Some(weight), Some(reps)) => weight.saturating_mul(Decimal::from(reps)),
        _ => Decimal::ZERO,
    }
}

fn saturating_total(volumes: impl Iterator<Item = Decimal>) -> Decimal {
    volumes.fold(Decimal::ZERO, Decimal::saturating_add)
}

pub fn workout_volume(workout: &WorkoutWithExercises) -> Decimal {
    saturating_total(workout.sets().map(set_volume))
}

pub fn compute_workout_stats(workouts: &[WorkoutWithExercises], now: DateTime<Utc>) -> WorkoutStats {
    let week_ago = now - Duration::days(WEEK_DAYS);

    let weekly_workouts = workouts
        .iter()
        .filter(|w| w.workout.date >= week_ago)
        .count() as i64;

    let total_weight = saturating_total(workouts.iter().map(workout_volume));

    let durations: Vec<i64> = workouts.iter().filter_map(|w| w.workout.duration).collect();
    let avg_duration = if durations.is_empty() {
        0
    } else {
        let total: f64 = durations.iter().map(|&d| d as f64).sum();
        (total / durations.len() as f64).round() as i64
    };

    WorkoutStats {
        weekly_workouts,
        total_weight,
        avg_duration,
    }
}

// ============================================================================
// Streaks
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutStreaks {
    /// Consecutive days ending today, or yesterday if nothing is logged yet today
    pub current: i64,
    pub best: i64,
}

pub fn workout_streaks(dates: impl IntoIterator<Item = NaiveDate>, today: NaiveDate) -> WorkoutStreaks {
    let days: BTreeSet<NaiveDate> = dates.into_iter().collect();

    let mut best = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for &day in &days {
        run = match previous {
            Some(p) if p.succ_opt() == Some(day) => run + 1,
            _ => 1,
        };
        best = best.max(run);
        previous = Some(day);
    }

    let anchor = if days.contains(&today) {
        Some(today)
    } else {
        today.pred_opt().filter(|d| days.contains(d))
    };

    let mut current = 0;
    let mut cursor = anchor;
    while let Some(day) = cursor.filter(|d| days.contains(d)) {
        current += 1;
        cursor = day.pred_opt();
    }

    WorkoutStreaks { current, best }
}

// ============================================================================
// Achievements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub earned: bool,
}

const TOTAL_MILESTONES: [(i64, &str); 4] = [
    (5, "Getting Started"),
    (10, "Committed"),
    (25, "Dedicated"),
    (50, "Unstoppable"),
];

const WEEKLY_MILESTONES: [(i64, &str); 2] = [(3, "Consistent Week"), (5, "Power Week")];

/// Milestone badges for a workout history
pub fn achievements(total_workouts: i64, weekly_workouts: i64) -> Vec<Achievement> {
    let totals = TOTAL_MILESTONES.iter().map(|&(n, title)| Achievement {
        id: format!("total-{n}"),
        title: title.to_string(),
        description: format!("Complete {n} workouts"),
        earned: total_workouts >= n,
    });
    let weekly = WEEKLY_MILESTONES.iter().map(|&(n, title)| Achievement {
        id: format!("week-{n}"),
        title: title.to_string(),
        description: format!("Work out {n} or more times in a week"),
        earned: weekly_workouts >= n,
    });
    totals.chain(weekly).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, RecordId, Workout, WorkoutExercise, WorkoutExerciseDetail};

    fn set(weight: Option<&str>, reps: Option<i64>, completed: bool) -> WorkoutSet {
        WorkoutSet {
            id: RecordId::from(1),
            workout_exercise_id: RecordId::from(1),
            set_number: 1,
            weight: weight.map(|w| w.parse().unwrap()),
            reps,
            completed,
        }
    }

    fn workout(date: DateTime<Utc>, duration: Option<i64>, sets: Vec<WorkoutSet>) -> WorkoutWithExercises {
        WorkoutWithExercises {
            workout: Workout {
                id: RecordId::from(1),
                name: "Session".into(),
                date,
                duration,
                notes: None,
                gender: Gender::Male,
                created_at: date,
            },
            exercises: vec![WorkoutExerciseDetail {
                entry: WorkoutExercise {
                    id: RecordId::from(1),
                    workout_id: RecordId::from(1),
                    exercise_id: RecordId::from(1),
                    order_index: 0,
                },
                exercise: None,
                sets,
            }],
        }
    }

    #[test]
    fn test_volume_counts_only_completed_sets() {
        let now = Utc::now();
        let w = workout(
            now,
            None,
            vec![set(Some("100"), Some(10), true), set(Some("100"), Some(10), false)],
        );
        assert_eq!(workout_volume(&w), Decimal::from(1000));
    }

    #[test]
    fn test_volume_skips_sets_missing_weight_or_reps() {
        assert_eq!(set_volume(&set(None, Some(10), true)), Decimal::ZERO);
        assert_eq!(set_volume(&set(Some("50"), None, true)), Decimal::ZERO);
        assert_eq!(set_volume(&set(Some("52.5"), Some(4), true)), Decimal::from(210));
    }

    #[test]
    fn test_oversized_sets_saturate_instead_of_panicking() {
        let now = Utc::now();
        let huge = set(Some("100000000000000000000"), Some(1_000_000_000), true);
        assert_eq!(set_volume(&huge), Decimal::MAX);

        let workouts = vec![
            workout(now, Some(i64::MAX), vec![huge.clone(), huge]),
            workout(now, Some(i64::MAX), vec![set(Some("10"), Some(1), true)]),
        ];
        let stats = compute_workout_stats(&workouts, now);
        assert_eq!(stats.total_weight, Decimal::MAX);
        assert!(stats.avg_duration > 0);
    }

    #[test]
    fn test_weekly_window() {
        let now = Utc::now();
        let workouts = vec![
            workout(now - Duration::days(8), None, vec![]),
            workout(now - Duration::days(6), None, vec![]),
        ];
        let stats = compute_workout_stats(&workouts, now);
        assert_eq!(stats.weekly_workouts, 1);
    }

    #[test]
    fn test_avg_duration_ignores_missing() {
        let now = Utc::now();
        let workouts = vec![
            workout(now, Some(30), vec![]),
            workout(now, Some(45), vec![]),
            workout(now, None, vec![]),
        ];
        let stats = compute_workout_stats(&workouts, now);
        assert_eq!(stats.avg_duration, 38);
    }

    #[test]
    fn test_empty_stats() {
        let stats = compute_workout_stats(&[], Utc::now());
        assert_eq!(stats.weekly_workouts, 0);
        assert_eq!(stats.total_weight, Decimal::ZERO);
        assert_eq!(stats.avg_duration, 0);
    }

    #[test]
    fn test_stats_serialize_total_weight_as_number() {
        let stats = WorkoutStats {
            weekly_workouts: 2,
            total_weight: "1250.5".parse().unwrap(),
            avg_duration: 40,
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["totalWeight"], 1250.5);
        assert_eq!(json["weeklyWorkouts"], 2);
    }

    #[test]
    fn test_streaks() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        let today = d(10);

        let streaks = workout_streaks([d(1), d(2), d(3), d(4), d(8), d(9), d(10)], today);
        assert_eq!(streaks, WorkoutStreaks { current: 3, best: 4 });

        // Nothing yet today; yesterday still counts
        let streaks = workout_streaks([d(8), d(9)], today);
        assert_eq!(streaks.current, 2);

        let streaks = workout_streaks([d(7), d(8)], today);
        assert_eq!(streaks, WorkoutStreaks { current: 0, best: 2 });

        assert_eq!(workout_streaks(Vec::new(), today), WorkoutStreaks::default());
    }

    #[test]
    fn test_streaks_ignore_duplicate_days() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        let streaks = workout_streaks([d(9), d(9), d(10)], d(10));
        assert_eq!(streaks, WorkoutStreaks { current: 2, best: 2 });
    }

    #[test]
    fn test_achievements() {
        let earned: Vec<_> = achievements(12, 3)
            .into_iter()
            .filter(|a| a.earned)
            .map(|a| a.id)
            .collect();
        assert_eq!(earned, vec!["total-5", "total-10", "week-3"]);
    }
}
