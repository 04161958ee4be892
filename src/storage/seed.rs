//! Default content
//!
//! Inserted into empty collections the first time a persistent store opens.
//! The memory store loads it at construction, but only the first
//! [`MEMORY_EXERCISE_COUNT`] exercises.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::models::{
    ChallengeCreate, ChallengeDifficulty, ChallengeType, Difficulty, ExerciseCreate,
    QuoteCategory, QuoteCreate, RecipeCreate,
};

/// Example exercises the memory store starts with
pub const MEMORY_EXERCISE_COUNT: usize = 3;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn exercise(
    name: &str,
    category: &str,
    instructions: &str,
    muscle_groups: &[&str],
    difficulty: Difficulty,
    equipment: &[&str],
) -> ExerciseCreate {
    ExerciseCreate {
        name: name.to_string(),
        category: category.to_string(),
        instructions: Some(instructions.to_string()),
        difficulty,
        muscle_groups: strings(muscle_groups),
        equipment: strings(equipment),
    }
}

pub fn exercises() -> Vec<ExerciseCreate> {
    vec![
        exercise(
            "Bench Press",
            "chest",
            "Lie on bench, lower bar to chest, press up",
            &["chest", "triceps", "shoulders"],
            Difficulty::Intermediate,
            &["barbell", "bench"],
        ),
        exercise(
            "Squats",
            "legs",
            "Stand with feet shoulder-width apart, squat down, stand up",
            &["quadriceps", "glutes", "hamstrings", "calves"],
            Difficulty::Beginner,
            &["barbell", "squat rack"],
        ),
        exercise(
            "Deadlift",
            "back",
            "Stand over bar, grip with both hands, lift with legs and back",
            &["hamstrings", "glutes", "erector_spinae", "traps", "lats"],
            Difficulty::Advanced,
            &["barbell", "plates"],
        ),
        exercise(
            "Pull-ups",
            "back",
            "Hang from bar, pull body up until chin over bar",
            &["lats", "rhomboids", "biceps", "traps"],
            Difficulty::Intermediate,
            &["pull-up bar"],
        ),
        exercise(
            "Overhead Press",
            "shoulders",
            "Press weight overhead from shoulder height",
            &["shoulders", "triceps", "traps"],
            Difficulty::Intermediate,
            &["barbell", "dumbbells"],
        ),
    ]
}

pub fn recipes() -> Vec<RecipeCreate> {
    vec![
        RecipeCreate {
            name: "Protein Power Bowl".into(),
            description: Some("High-protein breakfast bowl perfect for muscle building".into()),
            instructions: "1. Cook quinoa according to package instructions\n2. Scramble eggs with spinach\n3. Add Greek yogurt and berries\n4. Top with nuts and seeds".into(),
            servings: 1,
            prep_time: Some(15),
            cook_time: Some(10),
            calories: Some(520),
            protein: Some(Decimal::new(355, 1)),
            carbs: Some(Decimal::new(452, 1)),
            fat: Some(Decimal::new(183, 1)),
            ingredients: strings(&[
                "1 cup cooked quinoa",
                "2 eggs",
                "1/2 cup Greek yogurt",
                "1 cup spinach",
                "1/2 cup berries",
                "2 tbsp nuts",
            ]),
            tags: strings(&["high-protein", "breakfast", "muscle-building"]),
        },
        RecipeCreate {
            name: "Post-Workout Smoothie".into(),
            description: Some("Perfect recovery smoothie with optimal protein-carb ratio".into()),
            instructions: "1. Add all ingredients to blender\n2. Blend until smooth\n3. Serve immediately".into(),
            servings: 1,
            prep_time: Some(5),
            cook_time: Some(0),
            calories: Some(380),
            protein: Some(Decimal::new(280, 1)),
            carbs: Some(Decimal::new(520, 1)),
            fat: Some(Decimal::new(85, 1)),
            ingredients: strings(&[
                "1 scoop protein powder",
                "1 banana",
                "1 cup almond milk",
                "1 tbsp peanut butter",
                "1 cup ice",
            ]),
            tags: strings(&["post-workout", "smoothie", "recovery"]),
        },
    ]
}

pub fn quotes() -> Vec<QuoteCreate> {
    let quote = |text: &str, author: &str, category| QuoteCreate {
        quote: text.to_string(),
        author: Some(author.to_string()),
        category,
    };
    vec![
        quote(
            "The body achieves what the mind believes.",
            "Napoleon Hill",
            QuoteCategory::Motivation,
        ),
        quote("Champions train, losers complain.", "Unknown", QuoteCategory::Fitness),
        quote(
            "Your body can do it. It's your mind you need to convince.",
            "Unknown",
            QuoteCategory::Mindset,
        ),
    ]
}

/// Challenges dated on `today`
pub fn challenges(today: DateTime<Utc>) -> Vec<ChallengeCreate> {
    vec![
        ChallengeCreate {
            title: "Perfect Push-Up Day".into(),
            description: "Complete 100 push-ups throughout the day in any rep scheme".into(),
            challenge_type: ChallengeType::Workout,
            difficulty: ChallengeDifficulty::Medium,
            points: 15,
            date: today,
        },
        ChallengeCreate {
            title: "Hydration Hero".into(),
            description: "Drink at least 3 liters of water today".into(),
            challenge_type: ChallengeType::Habit,
            difficulty: ChallengeDifficulty::Easy,
            points: 10,
            date: today,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Validate;

    #[test]
    fn test_seed_content_is_valid() {
        assert!(exercises().iter().all(|e| e.validate().is_ok()));
        assert!(recipes().iter().all(|r| r.validate().is_ok()));
        assert!(challenges(Utc::now()).iter().all(|c| c.validate().is_ok()));
        assert!(exercises().len() >= MEMORY_EXERCISE_COUNT);
    }

    #[test]
    fn test_seed_decimals_keep_scale() {
        let recipes = recipes();
        assert_eq!(recipes[1].protein.map(|p| p.to_string()), Some("28.0".to_string()));
    }
}
