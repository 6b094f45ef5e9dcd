use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "difficulty_level", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

/// Catalog entry. Read-only through the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub muscle_group: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub instructions: Option<String>,
    pub equipment: Option<String>,
    pub calories: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExerciseFilter {
    pub muscle_group: Option<String>,
    pub difficulty: Option<Difficulty>,
    /// Case-insensitive match on name or description
    pub search: Option<String>,
}

impl ExerciseFilter {
    pub fn matches(&self, exercise: &Exercise) -> bool {
        if let Some(group) = &self.muscle_group {
            let same_group = exercise
                .muscle_group
                .as_deref()
                .map(|g| g.eq_ignore_ascii_case(group))
                .unwrap_or(false);
            if !same_group {
                return false;
            }
        }

        if let Some(difficulty) = self.difficulty {
            if exercise.difficulty != Some(difficulty) {
                return false;
            }
        }

        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let in_name = exercise.name.to_lowercase().contains(&needle);
            let in_description = exercise
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !in_name && !in_description {
                return false;
            }
        }

        true
    }
}
