//! Motivational content
//!
//! Quotes and dated daily challenges.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::serde_helpers::datetime_input;
use super::sql;
use super::validation::{Checker, FieldError, Validate};
use super::RecordId;
use crate::db::DbResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteCategory {
    Motivation,
    Fitness,
    Nutrition,
    Mindset,
}

impl QuoteCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteCategory::Motivation => "motivation",
            QuoteCategory::Fitness => "fitness",
            QuoteCategory::Nutrition => "nutrition",
            QuoteCategory::Mindset => "mindset",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "motivation" => Some(QuoteCategory::Motivation),
            "fitness" => Some(QuoteCategory::Fitness),
            "nutrition" => Some(QuoteCategory::Nutrition),
            "mindset" => Some(QuoteCategory::Mindset),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeType {
    Workout,
    Nutrition,
    Mindset,
    Habit,
}

impl ChallengeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeType::Workout => "workout",
            ChallengeType::Nutrition => "nutrition",
            ChallengeType::Mindset => "mindset",
            ChallengeType::Habit => "habit",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "workout" => Some(ChallengeType::Workout),
            "nutrition" => Some(ChallengeType::Nutrition),
            "mindset" => Some(ChallengeType::Mindset),
            "habit" => Some(ChallengeType::Habit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeDifficulty {
    Easy,
    Medium,
    Hard,
}

impl ChallengeDifficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeDifficulty::Easy => "easy",
            ChallengeDifficulty::Medium => "medium",
            ChallengeDifficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(ChallengeDifficulty::Easy),
            "medium" => Some(ChallengeDifficulty::Medium),
            "hard" => Some(ChallengeDifficulty::Hard),
            _ => None,
        }
    }
}

// ============================================================================
// Quotes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotivationalQuote {
    pub id: RecordId,
    pub quote: String,
    pub author: Option<String>,
    pub category: QuoteCategory,
}

/// Quote content, used for seeding
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteCreate {
    pub quote: String,
    #[serde(default)]
    pub author: Option<String>,
    pub category: QuoteCategory,
}

impl QuoteCreate {
    pub fn into_quote(self, id: RecordId) -> MotivationalQuote {
        MotivationalQuote {
            id,
            quote: self.quote,
            author: self.author,
            category: self.category,
        }
    }
}

impl MotivationalQuote {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: RecordId::from(row.get::<_, i64>("id")?),
            quote: row.get("quote")?,
            author: row.get("author")?,
            category: sql::variant(row, "category", QuoteCategory::from_str)?,
        })
    }

    pub fn insert(conn: &Connection, data: &QuoteCreate) -> DbResult<i64> {
        conn.execute(
            "INSERT INTO motivational_quotes (quote, author, category) VALUES (?1, ?2, ?3)",
            params![data.quote, data.author, data.category.as_str()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// One quote picked by SQLite's RNG
    pub fn random(conn: &Connection) -> DbResult<Option<Self>> {
        let mut stmt =
            conn.prepare("SELECT * FROM motivational_quotes ORDER BY RANDOM() LIMIT 1")?;

        let result = stmt.query_row([], Self::from_row);
        match result {
            Ok(quote) => Ok(Some(quote)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_by_category(conn: &Connection, category: QuoteCategory) -> DbResult<Vec<Self>> {
        let mut stmt =
            conn.prepare("SELECT * FROM motivational_quotes WHERE category = ?1 ORDER BY id")?;
        let quotes = stmt
            .query_map([category.as_str()], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(quotes)
    }

    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM motivational_quotes", [], |row| row.get(0))?;
        Ok(count)
    }
}

// ============================================================================
// Daily challenges
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyChallenge {
    pub id: RecordId,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub challenge_type: ChallengeType,
    pub difficulty: ChallengeDifficulty,
    pub points: i64,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl DailyChallenge {
    pub fn is_on(&self, day: NaiveDate) -> bool {
        self.date.date_naive() == day
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeCreate {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub challenge_type: ChallengeType,
    pub difficulty: ChallengeDifficulty,
    #[serde(default = "default_points")]
    pub points: i64,
    #[serde(deserialize_with = "datetime_input::deserialize")]
    pub date: DateTime<Utc>,
}

fn default_points() -> i64 {
    10
}

impl ChallengeCreate {
    pub fn into_challenge(self, id: RecordId, created_at: DateTime<Utc>) -> DailyChallenge {
        DailyChallenge {
            id,
            title: self.title,
            description: self.description,
            challenge_type: self.challenge_type,
            difficulty: self.difficulty,
            points: self.points,
            date: self.date,
            created_at,
        }
    }
}

impl Validate for ChallengeCreate {
    const SUBJECT: &'static str = "challenge";

    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Checker::default()
            .non_empty("title", &self.title)
            .non_empty("description", &self.description)
            .non_negative("points", Some(self.points))
            .finish()
    }
}

impl DailyChallenge {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: RecordId::from(row.get::<_, i64>("id")?),
            title: row.get("title")?,
            description: row.get("description")?,
            challenge_type: sql::variant(row, "challenge_type", ChallengeType::from_str)?,
            difficulty: sql::variant(row, "difficulty", ChallengeDifficulty::from_str)?,
            points: row.get("points")?,
            date: row.get("date")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn insert(conn: &Connection, data: &ChallengeCreate, now: DateTime<Utc>) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO daily_challenges (title, description, challenge_type, difficulty, points, date, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                data.title,
                data.description,
                data.challenge_type.as_str(),
                data.difficulty.as_str(),
                data.points,
                data.date,
                now,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM daily_challenges WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(challenge) => Ok(Some(challenge)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// First challenge dated within `[start, end)`
    pub fn first_between(
        conn: &Connection,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM daily_challenges WHERE date >= ?1 AND date < ?2 ORDER BY id LIMIT 1",
        )?;

        let result = stmt.query_row(params![start, end], Self::from_row);
        match result {
            Ok(challenge) => Ok(Some(challenge)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All challenges in insertion order
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM daily_challenges ORDER BY id")?;
        let challenges = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(challenges)
    }

    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM daily_challenges", [], |row| row.get(0))?;
        Ok(count)
    }
}
