use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use porta_application::{ActionConfigurationRepository, ContactRoleRepository};
use porta_core::{ActionConfigurationId, AppError, AppResult, ContactId, WebRoleId};
use porta_domain::ActionConfiguration;
use tokio::sync::RwLock;

#[cfg(test)]
mod tests;

/// In-memory repository for action configurations and contact roles.
#[derive(Debug, Default)]
pub struct InMemoryActionRepository {
    configurations: RwLock<HashMap<ActionConfigurationId, ActionConfiguration>>,
    contact_roles: RwLock<HashMap<ContactId, BTreeSet<WebRoleId>>>,
}

impl InMemoryActionRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            configurations: RwLock::new(HashMap::new()),
            contact_roles: RwLock::new(HashMap::new()),
        }
    }

    /// Stores a configuration.
    ///
    /// Fails with `Conflict` on a duplicate id or when another active
    /// configuration already owns the operation key.
    pub async fn insert_configuration(&self, configuration: ActionConfiguration) -> AppResult<()> {
        let mut configurations = self.configurations.write().await;

        if configurations.contains_key(&configuration.configuration_id()) {
            return Err(AppError::Conflict(format!(
                "action configuration '{}' already exists",
                configuration.configuration_id()
            )));
        }

        if configuration.is_active()
            && configurations.values().any(|existing| {
                existing.is_active() && existing.operation() == configuration.operation()
            })
        {
            return Err(AppError::Conflict(format!(
                "an active configuration for operation '{}' already exists",
                configuration.operation().as_str()
            )));
        }

        configurations.insert(configuration.configuration_id(), configuration);
        Ok(())
    }

    /// Grants one web role to a contact.
    pub async fn assign_web_role(&self, contact_id: ContactId, web_role_id: WebRoleId) {
        self.contact_roles
            .write()
            .await
            .entry(contact_id)
            .or_default()
            .insert(web_role_id);
    }
}

#[async_trait]
impl ActionConfigurationRepository for InMemoryActionRepository {
    async fn list_active_configurations(
        &self,
        operation: &str,
    ) -> AppResult<Vec<ActionConfiguration>> {
        let configurations = self.configurations.read().await;

        let mut values: Vec<ActionConfiguration> = configurations
            .values()
            .filter(|configuration| {
                configuration.is_active() && configuration.operation().as_str() == operation
            })
            .cloned()
            .collect();
        values.sort_by_key(|configuration| {
            (configuration.created_on(), configuration.configuration_id())
        });

        Ok(values)
    }
}

#[async_trait]
impl ContactRoleRepository for InMemoryActionRepository {
    async fn list_web_roles_for_contact(&self, contact_id: ContactId) -> AppResult<Vec<WebRoleId>> {
        Ok(self
            .contact_roles
            .read()
            .await
            .get(&contact_id)
            .map(|roles| roles.iter().copied().collect())
            .unwrap_or_default())
    }
}
