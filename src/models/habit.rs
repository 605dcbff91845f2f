use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::HabitError;

const MAX_NAME_LEN: usize = 80;
const MAX_CATEGORY_LEN: usize = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
}

impl Frequency {
    pub fn all() -> [Frequency; 2] {
        [Frequency::Daily, Frequency::Weekly]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
        }
    }

    /// Length of one period: a day, or seven days.
    pub fn period_length(&self) -> Duration {
        match self {
            Frequency::Daily => Duration::days(1),
            Frequency::Weekly => Duration::days(7),
        }
    }

    /// "today" / "this week", for user-facing messages.
    pub fn current_period_label(&self) -> &'static str {
        match self {
            Frequency::Daily => "today",
            Frequency::Weekly => "this week",
        }
    }

    pub fn unit(&self, n: u32) -> &'static str {
        match (self, n) {
            (Frequency::Daily, 1) => "day",
            (Frequency::Daily, _) => "days",
            (Frequency::Weekly, 1) => "week",
            (Frequency::Weekly, _) => "weeks",
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" | "d" => Ok(Frequency::Daily),
            "weekly" | "week" | "w" => Ok(Frequency::Weekly),
            _ => Err(anyhow::anyhow!(
                "Unknown frequency '{}'. Use: {}",
                s,
                Frequency::all().map(|f| f.as_str()).join(", ")
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub frequency: Frequency,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated input for creating or replacing a habit.
#[derive(Debug, Clone, PartialEq)]
pub struct HabitDraft {
    pub name: String,
    pub frequency: Frequency,
    pub category: Option<String>,
}

impl HabitDraft {
    /// Trims the name and category; an empty category counts as none.
    pub fn new(
        name: &str,
        frequency: Frequency,
        category: Option<&str>,
    ) -> Result<Self, HabitError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(HabitError::InvalidHabit("name cannot be empty".into()));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(HabitError::InvalidHabit(format!(
                "name must be at most {} characters",
                MAX_NAME_LEN
            )));
        }

        let category = category.map(str::trim).filter(|c| !c.is_empty());
        if let Some(c) = category {
            if c.chars().count() > MAX_CATEGORY_LEN {
                return Err(HabitError::InvalidHabit(format!(
                    "category must be at most {} characters",
                    MAX_CATEGORY_LEN
                )));
            }
        }

        Ok(Self {
            name: name.to_string(),
            frequency,
            category: category.map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_parses_loosely() {
        assert_eq!(Frequency::from_str("Daily").unwrap(), Frequency::Daily);
        assert_eq!(Frequency::from_str(" weekly ").unwrap(), Frequency::Weekly);
        assert_eq!(Frequency::from_str("w").unwrap(), Frequency::Weekly);
        assert!(Frequency::from_str("monthly").is_err());
    }

    #[test]
    fn frequency_serializes_lowercase() {
        let json = serde_json::to_string(&Frequency::Weekly).unwrap();
        assert_eq!(json, "\"weekly\"");
    }

    #[test]
    fn draft_trims_and_drops_empty_category() {
        let draft = HabitDraft::new("  Read  ", Frequency::Daily, Some("   ")).unwrap();
        assert_eq!(draft.name, "Read");
        assert_eq!(draft.category, None);

        let draft = HabitDraft::new("Run", Frequency::Weekly, Some(" fitness ")).unwrap();
        assert_eq!(draft.category.as_deref(), Some("fitness"));
    }

    #[test]
    fn draft_rejects_blank_and_long_names() {
        assert!(matches!(
            HabitDraft::new("   ", Frequency::Daily, None),
            Err(HabitError::InvalidHabit(_))
        ));
        let long = "x".repeat(81);
        assert!(HabitDraft::new(&long, Frequency::Daily, None).is_err());
        let just_fits = "x".repeat(80);
        assert!(HabitDraft::new(&just_fits, Frequency::Daily, None).is_ok());
    }

    #[test]
    fn draft_rejects_long_category() {
        let long = "c".repeat(51);
        assert!(HabitDraft::new("Read", Frequency::Daily, Some(&long)).is_err());
    }
}
