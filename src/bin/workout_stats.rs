//! Print workout statistics for the configured store.
//!
//! Shows the aggregate stats and streaks, then each workout's volume and
//! exercises, then the body summary when a profile and weight are stored.

use chrono::Utc;
use fittrack::config::ServerConfig;
use fittrack::metrics::{bmi_for, round_one_decimal, workout_streaks, workout_volume, BmiCategory};
use fittrack::storage::create_storage;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;
    println!("Storage: {} ({})", config.backend, config.database);

    let storage = create_storage(config.backend, config.database);
    storage.connect().await?;

    let details = storage.get_all_workout_details().await?;
    let stats = storage.get_workout_stats().await?;
    let streaks = workout_streaks(
        details.iter().map(|d| d.workout.date.date_naive()),
        Utc::now().date_naive(),
    );

    println!("Workouts: {}", details.len());
    println!("  This week: {}", stats.weekly_workouts);
    println!("  Total volume: {}", stats.total_weight);
    println!("  Average duration: {} min", stats.avg_duration);
    println!("  Current streak: {} days (best {})", streaks.current, streaks.best);

    if !details.is_empty() {
        println!();
        println!("{:<12} {:<30} {:>10}", "Date", "Workout", "Volume");
        for detail in &details {
            println!(
                "{:<12} {:<30} {:>10}",
                detail.workout.date.format("%Y-%m-%d").to_string(),
                detail.workout.name,
                workout_volume(detail)
            );
            for entry in &detail.exercises {
                match &entry.exercise {
                    Some(exercise) => println!(
                        "    {} ({}): {} sets",
                        exercise.name,
                        exercise.difficulty.display_name(),
                        entry.sets.len()
                    ),
                    None => println!("    exercise {}: {} sets", entry.entry.exercise_id, entry.sets.len()),
                }
            }
        }
    }

    let profile = storage.get_user_profile().await?;
    let weight = storage.get_latest_weight().await?;
    if let Some(bmi) = profile.as_ref().zip(weight.as_ref()).and_then(|(p, w)| bmi_for(p, w)) {
        println!();
        println!(
            "BMI: {} ({})",
            round_one_decimal(bmi),
            BmiCategory::from_bmi(bmi).display_name()
        );
    }
    if let Some(goal) = storage.get_nutrition_goals().await? {
        println!("Activity level: {}", goal.activity_level.display_name());
    }

    storage.disconnect().await?;
    Ok(())
}
