use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{Difficulty, Exercise};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct ExercisePlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_name: String,
    pub description: Option<String>,
    pub goal: String,
    pub difficulty: Option<Difficulty>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub completed_sessions: i32,
    pub total_sessions: i32,
    pub estimated_calories: Option<i32>,
    pub notification_time: Option<NaiveTime>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExercisePlan {
    /// Share of planned sessions already completed, 0-100.
    pub fn progress_percentage(&self) -> f64 {
        if self.total_sessions <= 0 {
            return 0.0;
        }
        (self.completed_sessions as f64 / self.total_sessions as f64 * 100.0).min(100.0)
    }
}

/// Join row between a plan and the catalog, with prescribed targets.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct PlanExercise {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub exercise_id: Uuid,
    pub order_in_plan: i32,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub duration_minutes: Option<i32>,
    pub distance_km: Option<f64>,
    pub weight_kg: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanExerciseDetail {
    #[serde(flatten)]
    pub plan_exercise: PlanExercise,
    pub exercise: Exercise,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanExerciseInput {
    pub exercise_id: Uuid,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub duration_minutes: Option<i32>,
    pub distance_km: Option<f64>,
    pub weight_kg: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlanRequest {
    pub plan_name: String,
    pub description: Option<String>,
    pub goal: String,
    pub difficulty: Option<Difficulty>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub total_sessions: i32,
    pub estimated_calories: Option<i32>,
    pub notification_time: Option<NaiveTime>,
    #[serde(default)]
    pub exercises: Vec<PlanExerciseInput>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePlanRequest {
    pub plan_name: Option<String>,
    pub description: Option<String>,
    pub goal: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_sessions: Option<i32>,
    pub estimated_calories: Option<i32>,
    pub notification_time: Option<NaiveTime>,
}

#[derive(Debug, Serialize)]
pub struct PlanDetail {
    pub plan: ExercisePlan,
    pub exercises: Vec<PlanExerciseDetail>,
    pub progress_percentage: f64,
}
