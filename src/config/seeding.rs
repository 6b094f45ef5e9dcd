use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Difficulty;

struct CatalogEntry {
    name: &'static str,
    description: &'static str,
    muscle_group: &'static str,
    difficulty: Difficulty,
    instructions: &'static str,
    equipment: &'static str,
    calories: i32,
}

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        name: "Push-up",
        description: "Bodyweight press from a plank position",
        muscle_group: "chest",
        difficulty: Difficulty::Beginner,
        instructions: "Keep the body straight, lower the chest to the floor and press back up.",
        equipment: "none",
        calories: 7,
    },
    CatalogEntry {
        name: "Squat",
        description: "Bodyweight squat to parallel",
        muscle_group: "legs",
        difficulty: Difficulty::Beginner,
        instructions: "Feet shoulder-width apart, sit back until thighs are parallel, stand up.",
        equipment: "none",
        calories: 8,
    },
    CatalogEntry {
        name: "Burpee",
        description: "Squat thrust with a jump",
        muscle_group: "full_body",
        difficulty: Difficulty::Intermediate,
        instructions: "Drop to a plank, do a push-up, jump the feet in and jump up.",
        equipment: "none",
        calories: 12,
    },
    CatalogEntry {
        name: "Mountain Climber",
        description: "Alternating knee drives from a plank",
        muscle_group: "core",
        difficulty: Difficulty::Intermediate,
        instructions: "From a plank, drive the knees to the chest one at a time at pace.",
        equipment: "none",
        calories: 10,
    },
    CatalogEntry {
        name: "Plank",
        description: "Isometric hold on the forearms",
        muscle_group: "core",
        difficulty: Difficulty::Beginner,
        instructions: "Hold a straight line from head to heels, bracing the core.",
        equipment: "mat",
        calories: 4,
    },
    CatalogEntry {
        name: "Deadlift",
        description: "Barbell hip hinge from the floor",
        muscle_group: "back",
        difficulty: Difficulty::Advanced,
        instructions: "Hinge at the hips, grip the bar, keep the back neutral and stand up tall.",
        equipment: "barbell",
        calories: 9,
    },
    CatalogEntry {
        name: "Dumbbell Row",
        description: "Single-arm row supported on a bench",
        muscle_group: "back",
        difficulty: Difficulty::Beginner,
        instructions: "Pull the dumbbell to the hip keeping the elbow close to the body.",
        equipment: "dumbbell",
        calories: 6,
    },
    CatalogEntry {
        name: "Jump Rope",
        description: "Continuous skipping",
        muscle_group: "cardio",
        difficulty: Difficulty::Beginner,
        instructions: "Stay on the balls of the feet and turn the rope from the wrists.",
        equipment: "jump rope",
        calories: 13,
    },
];

/// Fills the exercise catalog on a fresh database.
pub struct DatabaseSeeder {
    pool: PgPool,
}

impl DatabaseSeeder {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn seed_all(&self) -> Result<()> {
        tracing::info!("Starting database seeding...");

        let inserted = self.seed_exercises().await?;

        tracing::info!(inserted, "Database seeding completed!");
        Ok(())
    }

    /// Insert catalog entries that are not there yet; returns how many were added.
    pub async fn seed_exercises(&self) -> Result<u64> {
        let mut inserted = 0;

        for entry in CATALOG {
            let result = sqlx::query(
                "INSERT INTO exercises
                    (id, name, description, muscle_group, difficulty, instructions, equipment, calories)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                 ON CONFLICT (name) DO NOTHING",
            )
            .bind(Uuid::new_v4())
            .bind(entry.name)
            .bind(entry.description)
            .bind(entry.muscle_group)
            .bind(entry.difficulty)
            .bind(entry.instructions)
            .bind(entry.equipment)
            .bind(entry.calories)
            .execute(&self.pool)
            .await?;

            inserted += result.rows_affected();
        }

        Ok(inserted)
    }
}
