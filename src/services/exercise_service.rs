use anyhow::Result;
use uuid::Uuid;

use crate::models::{Exercise, ExerciseFilter};
use crate::store::DynFitnessStore;

/// Read-only access to the exercise library.
#[derive(Clone)]
pub struct ExerciseService {
    store: DynFitnessStore,
}

impl ExerciseService {
    pub fn new(store: DynFitnessStore) -> Self {
        Self { store }
    }

    pub async fn list_exercises(&self, filter: &ExerciseFilter) -> Result<Vec<Exercise>> {
        let exercises = self.store.list_exercises(filter).await?;
        tracing::debug!(count = exercises.len(), ?filter, "Listed exercises");
        Ok(exercises)
    }

    pub async fn get_exercise(&self, exercise_id: Uuid) -> Result<Option<Exercise>> {
        self.store.get_exercise(exercise_id).await
    }
}
