//! Sign-in, sign-up, sign-out and profile edits

use crate::provider::SessionProvider;
use chrono::Utc;
use pawfeed_http::types::{
    Identity, Profile, ProfileUpdate, RegistrationRequest, SignInRequest, SignInResponse,
};
use pawfeed_http::{ApiRequest, ClientError, RequestChannel};
use tracing::info;

/// Account flows that change who is signed in
#[derive(Clone)]
pub struct AccountService {
    provider: SessionProvider,
}

impl AccountService {
    pub fn new(provider: SessionProvider) -> Self {
        Self { provider }
    }

    /// Sign in and start a fresh session
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<Identity, ClientError> {
        let request = SignInRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response: SignInResponse = self
            .provider
            .side_channel()
            .post(&self.provider.config().endpoints.login, &request)
            .await?
            .json()?;

        self.provider.freshness().record_refresh(Utc::now());
        self.provider
            .set_current_user(Some(response.user.clone()))
            .await;
        info!(username = %response.user.username, "signed in");
        Ok(response.user)
    }

    /// Register a new account; the caller signs in separately
    pub async fn sign_up(
        &self,
        username: &str,
        password: &str,
        password_confirmation: &str,
    ) -> Result<(), ClientError> {
        let request = RegistrationRequest {
            username: username.to_string(),
            password1: password.to_string(),
            password2: password_confirmation.to_string(),
        };
        self.provider
            .side_channel()
            .post(&self.provider.config().endpoints.registration, &request)
            .await?;
        Ok(())
    }

    /// End the session locally, whatever the server says
    pub async fn sign_out(&self) -> Result<(), ClientError> {
        let outcome = self
            .provider
            .side_channel()
            .send(ApiRequest::post(&self.provider.config().endpoints.logout))
            .await;

        self.provider.set_current_user(None).await;
        self.provider.freshness().clear();
        info!("signed out");
        outcome.map(|_| ())
    }

    /// Edit a profile and mirror the new image into the current identity
    pub async fn update_profile(
        &self,
        profile_id: u64,
        update: &ProfileUpdate,
    ) -> Result<Profile, ClientError> {
        let profile: Profile = self
            .provider
            .api_channel()
            .put(&self.provider.config().endpoints.profile(profile_id), update)
            .await?
            .json()?;

        let image = profile.image.clone();
        self.provider
            .update_current_user(|current| {
                current.map(|identity| {
                    if identity.profile_id == Some(profile_id) {
                        Identity {
                            profile_image: image,
                            ..identity.clone()
                        }
                    } else {
                        identity.clone()
                    }
                })
            })
            .await;
        Ok(profile)
    }
}
