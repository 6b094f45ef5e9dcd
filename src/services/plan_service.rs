use anyhow::Result;
use uuid::Uuid;

use crate::models::{
    validate_date_range, validate_plan_exercises, validate_plan_request, validate_plan_update,
    CreatePlanRequest, ExercisePlan, PlanDetail, PlanExerciseDetail, PlanExerciseInput,
    UpdatePlanRequest,
};
use crate::services::ValidationError;
use crate::store::DynFitnessStore;

/// Plans and their exercise lists, always scoped to the owning user.
#[derive(Clone)]
pub struct PlanService {
    store: DynFitnessStore,
}

impl PlanService {
    pub fn new(store: DynFitnessStore) -> Self {
        Self { store }
    }

    pub async fn create_plan(&self, user_id: Uuid, request: CreatePlanRequest) -> Result<PlanDetail> {
        validate_plan_request(&request).map_err(ValidationError::from)?;
        self.ensure_exercises_exist(&request.exercises).await?;

        let plan = self.store.create_plan(user_id, &request).await?;
        let exercises = self.store.list_plan_exercises(plan.id).await?;

        tracing::info!(
            plan_id = %plan.id,
            user_id = %user_id,
            exercises = exercises.len(),
            "Created exercise plan"
        );

        Ok(detail(plan, exercises))
    }

    pub async fn list_plans(&self, user_id: Uuid) -> Result<Vec<ExercisePlan>> {
        self.store.list_plans(user_id).await
    }

    pub async fn get_plan(&self, user_id: Uuid, plan_id: Uuid) -> Result<Option<PlanDetail>> {
        let Some(plan) = self.store.get_plan(user_id, plan_id).await? else {
            return Ok(None);
        };
        let exercises = self.store.list_plan_exercises(plan.id).await?;
        Ok(Some(detail(plan, exercises)))
    }

    pub async fn update_plan(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        request: UpdatePlanRequest,
    ) -> Result<Option<ExercisePlan>> {
        validate_plan_update(&request).map_err(ValidationError::from)?;

        if request.start_date.is_some() || request.end_date.is_some() {
            let Some(current) = self.store.get_plan(user_id, plan_id).await? else {
                return Ok(None);
            };
            validate_date_range(
                request.start_date.or(current.start_date),
                request.end_date.or(current.end_date),
            )
            .map_err(ValidationError::from)?;
        }

        self.store.update_plan(user_id, plan_id, &request).await
    }

    pub async fn delete_plan(&self, user_id: Uuid, plan_id: Uuid) -> Result<bool> {
        let deleted = self.store.delete_plan(user_id, plan_id).await?;
        if deleted {
            tracing::info!(plan_id = %plan_id, user_id = %user_id, "Deleted exercise plan");
        }
        Ok(deleted)
    }

    /// Swap the plan's exercise list for `exercises`, in that order.
    pub async fn replace_exercises(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        exercises: Vec<PlanExerciseInput>,
    ) -> Result<Option<Vec<PlanExerciseDetail>>> {
        validate_plan_exercises(&exercises).map_err(ValidationError::from)?;

        if self.store.get_plan(user_id, plan_id).await?.is_none() {
            return Ok(None);
        }
        self.ensure_exercises_exist(&exercises).await?;

        self.store.replace_plan_exercises(plan_id, &exercises).await?;
        let details = self.store.list_plan_exercises(plan_id).await?;
        Ok(Some(details))
    }

    /// Make `plan_id` the user's only active plan.
    pub async fn activate(&self, user_id: Uuid, plan_id: Uuid) -> Result<Option<ExercisePlan>> {
        let plan = self.store.activate_plan(user_id, plan_id).await?;
        match &plan {
            Some(plan) => tracing::info!(plan_id = %plan.id, user_id = %user_id, "Activated plan"),
            None => tracing::warn!(plan_id = %plan_id, user_id = %user_id, "Activation of unknown plan"),
        }
        Ok(plan)
    }

    pub async fn deactivate(&self, user_id: Uuid, plan_id: Uuid) -> Result<Option<ExercisePlan>> {
        self.store.deactivate_plan(user_id, plan_id).await
    }

    pub async fn active_plan(&self, user_id: Uuid) -> Result<Option<PlanDetail>> {
        let active = self.store.list_active_plans(user_id).await?;
        let Some(plan) = active.into_iter().next() else {
            return Ok(None);
        };
        let exercises = self.store.list_plan_exercises(plan.id).await?;
        Ok(Some(detail(plan, exercises)))
    }

    async fn ensure_exercises_exist(&self, exercises: &[PlanExerciseInput]) -> Result<()> {
        if exercises.is_empty() {
            return Ok(());
        }
        let ids: Vec<Uuid> = exercises.iter().map(|e| e.exercise_id).collect();
        let missing = self.store.missing_exercises(&ids).await?;
        if !missing.is_empty() {
            let listed: Vec<String> = missing.iter().map(|id| id.to_string()).collect();
            return Err(ValidationError(format!("Unknown exercises: {}", listed.join(", "))).into());
        }
        Ok(())
    }
}

fn detail(plan: ExercisePlan, exercises: Vec<PlanExerciseDetail>) -> PlanDetail {
    let progress_percentage = plan.progress_percentage();
    PlanDetail {
        plan,
        exercises,
        progress_percentage,
    }
}
