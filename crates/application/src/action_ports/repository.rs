use async_trait::async_trait;
use porta_core::{AppResult, ContactId, WebRoleId};
use porta_domain::ActionConfiguration;

/// Repository port for action configuration lookups.
#[async_trait]
pub trait ActionConfigurationRepository: Send + Sync {
    /// Lists active configurations whose operation key equals `operation`.
    async fn list_active_configurations(
        &self,
        operation: &str,
    ) -> AppResult<Vec<ActionConfiguration>>;
}

/// Repository port for portal contact role membership.
#[async_trait]
pub trait ContactRoleRepository: Send + Sync {
    /// Lists web roles assigned to one contact.
    async fn list_web_roles_for_contact(&self, contact_id: ContactId) -> AppResult<Vec<WebRoleId>>;
}
