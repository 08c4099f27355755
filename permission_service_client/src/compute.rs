use model_permissions::AvailablePermissions;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{ClientError, ResponseExt};

use super::PermissionServiceClient;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputePermissionsRequest {
    pub resource_id: Uuid,
    pub user_id: Uuid,
}

impl PermissionServiceClient {
    /// The flags one user holds on a resource (page, post category or
    /// proposal). The service decides which checks apply from the resource
    /// id alone.
    #[tracing::instrument(skip(self))]
    pub async fn compute(
        &self,
        resource_id: Uuid,
        user_id: Uuid,
    ) -> Result<AvailablePermissions, ClientError> {
        let body = serde_json::to_value(ComputePermissionsRequest {
            resource_id,
            user_id,
        })
        .map_err(|e| ClientError::Generic(anyhow::anyhow!(e.to_string())))?;

        let response = self
            .client
            .post(format!("{}/api/permissions/compute", self.url))
            .json(&body)
            .send()
            .await
            .map_client_error()
            .await?;

        let result = response.json::<AvailablePermissions>().await.map_err(|e| {
            ClientError::Generic(anyhow::anyhow!(
                "unable to parse response from compute: {}",
                e.to_string()
            ))
        })?;

        Ok(result)
    }
}
