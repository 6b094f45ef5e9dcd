use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use std::collections::HashSet;

use super::{
    CreateNotificationRequest, CreatePlanRequest, LogUpdate, PlanExerciseInput, UpdatePlanRequest,
    UpdateProfileRequest,
};

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Canonical form under which an email is stored and looked up
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Email validation
pub fn validate_email(email: &str) -> Result<()> {
    if email.trim().is_empty() {
        return Err(anyhow!("Email cannot be empty"));
    }

    if !email.contains('@') || !email.contains('.') {
        return Err(anyhow!("Invalid email format"));
    }

    if email.len() > 255 {
        return Err(anyhow!("Email cannot be longer than 255 characters"));
    }

    Ok(())
}

/// Password validation
pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(anyhow!("Password cannot be empty"));
    }

    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(anyhow!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }

    if password.len() > 128 {
        return Err(anyhow!("Password cannot be longer than 128 characters"));
    }

    Ok(())
}

fn require_text(value: &str, field_name: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(anyhow!("{} cannot be empty", field_name));
    }
    if value.len() > 200 {
        return Err(anyhow!("{} cannot be longer than 200 characters", field_name));
    }
    Ok(())
}

fn require_non_negative(value: Option<i32>, field_name: &str) -> Result<()> {
    match value {
        Some(v) if v < 0 => Err(anyhow!("{} cannot be negative", field_name)),
        _ => Ok(()),
    }
}

/// Validate a new plan and its exercise list
pub fn validate_plan_request(request: &CreatePlanRequest) -> Result<()> {
    require_text(&request.plan_name, "Plan name")?;
    require_text(&request.goal, "Goal")?;
    require_non_negative(Some(request.total_sessions), "Total sessions")?;
    require_non_negative(request.estimated_calories, "Estimated calories")?;

    validate_date_range(request.start_date, request.end_date)?;

    validate_plan_exercises(&request.exercises)
}

/// Exercise list of a plan: no duplicates, no negative targets
pub fn validate_plan_exercises(exercises: &[PlanExerciseInput]) -> Result<()> {
    let mut seen = HashSet::new();
    for exercise in exercises {
        if !seen.insert(exercise.exercise_id) {
            return Err(anyhow!("Exercise {} is listed twice", exercise.exercise_id));
        }
        require_non_negative(exercise.sets, "Sets")?;
        require_non_negative(exercise.reps, "Reps")?;
        require_non_negative(exercise.duration_minutes, "Duration")?;
        if exercise.weight_kg.map(|w| w < 0.0).unwrap_or(false) {
            return Err(anyhow!("Weight cannot be negative"));
        }
        if exercise.distance_km.map(|d| d < 0.0).unwrap_or(false) {
            return Err(anyhow!("Distance cannot be negative"));
        }
    }

    Ok(())
}

pub fn validate_plan_update(request: &UpdatePlanRequest) -> Result<()> {
    if let Some(name) = &request.plan_name {
        require_text(name, "Plan name")?;
    }
    if let Some(goal) = &request.goal {
        require_text(goal, "Goal")?;
    }
    require_non_negative(request.total_sessions, "Total sessions")?;
    require_non_negative(request.estimated_calories, "Estimated calories")?;
    validate_date_range(request.start_date, request.end_date)
}

/// An end date, when both are known, may not precede the start date
pub fn validate_date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(anyhow!("End date cannot be before start date"));
        }
    }
    Ok(())
}

pub fn validate_log_update(update: &LogUpdate) -> Result<()> {
    require_non_negative(update.sets_completed, "Sets")?;
    require_non_negative(update.reps_completed, "Reps")?;
    require_non_negative(update.duration_minutes, "Duration")?;
    if update.weight_kg.map(|w| w < 0.0 || !w.is_finite()).unwrap_or(false) {
        return Err(anyhow!("Weight must be a non-negative number"));
    }
    Ok(())
}

/// Validate body metrics entered at registration or on the profile page
pub fn validate_body_metrics(age: Option<i32>, weight_kg: Option<f64>, height_cm: Option<f64>) -> Result<()> {
    if let Some(age) = age {
        if !(10..=120).contains(&age) {
            return Err(anyhow!("Age must be between 10 and 120"));
        }
    }
    if let Some(weight) = weight_kg {
        if !(20.0..=400.0).contains(&weight) {
            return Err(anyhow!("Weight must be between 20 and 400 kg"));
        }
    }
    if let Some(height) = height_cm {
        if !(80.0..=260.0).contains(&height) {
            return Err(anyhow!("Height must be between 80 and 260 cm"));
        }
    }
    Ok(())
}

pub fn validate_profile_update(request: &UpdateProfileRequest) -> Result<()> {
    if let Some(name) = &request.full_name {
        require_text(name, "Full name")?;
    }
    validate_body_metrics(request.age, request.weight_kg, request.height_cm)
}

pub fn validate_notification(request: &CreateNotificationRequest) -> Result<()> {
    require_text(&request.title, "Title")?;
    if request.message.trim().is_empty() {
        return Err(anyhow!("Message cannot be empty"));
    }
    Ok(())
}
