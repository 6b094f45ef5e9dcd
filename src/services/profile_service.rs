use anyhow::Result;
use uuid::Uuid;

use crate::models::{validate_profile_update, Profile, UpdateProfileRequest};
use crate::services::ValidationError;
use crate::store::DynFitnessStore;

#[derive(Clone)]
pub struct ProfileService {
    store: DynFitnessStore,
}

impl ProfileService {
    pub fn new(store: DynFitnessStore) -> Self {
        Self { store }
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        self.store.get_profile(user_id).await
    }

    /// Partial update; fields left out of the request keep their value.
    pub async fn update_profile(&self, user_id: Uuid, request: UpdateProfileRequest) -> Result<Option<Profile>> {
        validate_profile_update(&request).map_err(ValidationError::from)?;
        let profile = self.store.update_profile(user_id, &request).await?;
        if profile.is_some() {
            tracing::info!(user_id = %user_id, "Profile updated");
        }
        Ok(profile)
    }
}
