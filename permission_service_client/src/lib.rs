//! HTTP client for the external permission computation service.

use async_trait::async_trait;
use fanout_env::{required_var, EnvError};
use model_permissions::AvailablePermissions;
use notification_fanout::store::PermissionClient;
use uuid::Uuid;

pub mod compute;
pub mod error;

#[derive(Clone, Debug)]
pub struct PermissionServiceClient {
    url: String,
    client: reqwest::Client,
}

impl PermissionServiceClient {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }

    /// Build the client from the `PERMISSIONS_API_URL` variable.
    pub fn new_from_env() -> Result<Self, EnvError> {
        Ok(Self::new(required_var("PERMISSIONS_API_URL")?))
    }
}

#[async_trait]
impl PermissionClient for PermissionServiceClient {
    async fn compute_permissions(
        &self,
        resource_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<AvailablePermissions> {
        Ok(self.compute(resource_id, user_id).await?)
    }
}
