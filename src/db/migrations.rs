//! Database migrations
//!
//! Schema creation and migration logic. Version 1 holds the typed tables used
//! by the mapped backend, version 2 the generic document collections.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
    }

    if current_version < 2 {
        migrate_v2(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (2)", [])?;
    }

    Ok(())
}

/// Migration v1: typed entity tables
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- EXERCISES
        -- Exercise catalog; arrays stored as JSON text
        -- ============================================
        CREATE TABLE exercises (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            category TEXT NOT NULL,
            instructions TEXT,
            difficulty TEXT NOT NULL DEFAULT 'beginner'
                CHECK(difficulty IN ('beginner', 'intermediate', 'advanced')),
            muscle_groups TEXT NOT NULL DEFAULT '[]',
            equipment TEXT NOT NULL DEFAULT '[]'
        );

        CREATE INDEX idx_exercises_name ON exercises(name);

        -- ============================================
        -- WORKOUTS
        -- A session, owning exercise entries and sets
        -- ============================================
        CREATE TABLE workouts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            date TEXT NOT NULL,
            duration INTEGER,                    -- minutes
            notes TEXT,
            gender TEXT NOT NULL DEFAULT 'male' CHECK(gender IN ('male', 'female')),
            created_at TEXT NOT NULL
        );

        CREATE INDEX idx_workouts_date ON workouts(date);

        CREATE TABLE workout_exercises (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            workout_id INTEGER NOT NULL REFERENCES workouts(id) ON DELETE CASCADE,
            exercise_id INTEGER NOT NULL REFERENCES exercises(id) ON DELETE RESTRICT,
            order_index INTEGER NOT NULL
        );

        CREATE INDEX idx_workout_exercises_workout ON workout_exercises(workout_id);

        CREATE TABLE sets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            workout_exercise_id INTEGER NOT NULL
                REFERENCES workout_exercises(id) ON DELETE CASCADE,
            set_number INTEGER NOT NULL,
            weight TEXT,                         -- decimal text, exact
            reps INTEGER,
            completed INTEGER NOT NULL DEFAULT 1
        );

        CREATE INDEX idx_sets_workout_exercise ON sets(workout_exercise_id);

        -- ============================================
        -- NUTRITION
        -- ============================================
        CREATE TABLE meals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            meal_type TEXT NOT NULL CHECK(meal_type IN ('breakfast', 'lunch', 'dinner', 'snack')),
            date TEXT NOT NULL,
            calories INTEGER,
            protein TEXT,
            carbs TEXT,
            fat TEXT,
            created_at TEXT NOT NULL
        );

        CREATE INDEX idx_meals_date ON meals(date);

        CREATE TABLE recipes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT,
            instructions TEXT NOT NULL,
            servings INTEGER NOT NULL DEFAULT 1,
            prep_time INTEGER,
            cook_time INTEGER,
            calories INTEGER,
            protein TEXT,
            carbs TEXT,
            fat TEXT,
            ingredients TEXT NOT NULL DEFAULT '[]',
            tags TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL
        );

        -- Single row, id pinned to 1
        CREATE TABLE nutrition_goals (
            id INTEGER PRIMARY KEY CHECK(id = 1),
            daily_calories INTEGER NOT NULL,
            daily_protein TEXT NOT NULL,
            daily_carbs TEXT NOT NULL,
            daily_fat TEXT NOT NULL,
            maintenance_calories INTEGER,
            weight_goal TEXT NOT NULL DEFAULT 'maintain'
                CHECK(weight_goal IN ('lose', 'maintain', 'gain')),
            activity_level TEXT NOT NULL DEFAULT 'moderate'
                CHECK(activity_level IN ('sedentary', 'light', 'moderate', 'active', 'very_active')),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        -- ============================================
        -- BODY
        -- ============================================
        CREATE TABLE weight_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            weight TEXT NOT NULL,
            unit TEXT NOT NULL DEFAULT 'lbs' CHECK(unit IN ('lbs', 'kg')),
            date TEXT NOT NULL,
            notes TEXT,
            created_at TEXT NOT NULL
        );

        CREATE INDEX idx_weight_entries_date ON weight_entries(date);

        -- Single row, id pinned to 1
        CREATE TABLE user_profile (
            id INTEGER PRIMARY KEY CHECK(id = 1),
            height TEXT,
            height_unit TEXT NOT NULL DEFAULT 'inches' CHECK(height_unit IN ('inches', 'cm')),
            age INTEGER,
            gender TEXT NOT NULL DEFAULT 'male' CHECK(gender IN ('male', 'female')),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        -- ============================================
        -- MOTIVATION
        -- ============================================
        CREATE TABLE motivational_quotes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            quote TEXT NOT NULL,
            author TEXT,
            category TEXT NOT NULL
                CHECK(category IN ('motivation', 'fitness', 'nutrition', 'mindset'))
        );

        CREATE TABLE daily_challenges (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            challenge_type TEXT NOT NULL
                CHECK(challenge_type IN ('workout', 'nutrition', 'mindset', 'habit')),
            difficulty TEXT NOT NULL CHECK(difficulty IN ('easy', 'medium', 'hard')),
            points INTEGER NOT NULL DEFAULT 10,
            date TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX idx_daily_challenges_date ON daily_challenges(date);
        "#,
    )?;

    Ok(())
}

/// Migration v2: schemaless document collections
fn migrate_v2(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE documents (
            collection TEXT NOT NULL,
            key TEXT NOT NULL,                   -- 24 hex chars
            body TEXT NOT NULL,                  -- JSON object
            inserted_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            PRIMARY KEY (collection, key)
        );

        CREATE INDEX idx_documents_collection ON documents(collection);
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_migrations')",
        [],
        |row| row.get(0),
    )?;
    if !exists {
        return Ok(true);
    }
    Ok(get_schema_version(conn)? < SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_reach_current_version() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(needs_migration(&conn).unwrap());

        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert!(!needs_migration(&conn).unwrap());
    }

    #[test]
    fn test_migrations_are_rerunnable() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_singleton_tables_reject_second_row() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let result = conn.execute(
            "INSERT INTO user_profile (id, created_at, updated_at) VALUES (2, 'x', 'x')",
            [],
        );
        assert!(result.is_err());
    }
}
