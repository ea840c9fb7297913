use std::sync::Arc;

use porta_core::{AppError, AppResult};
use porta_domain::ActionConfiguration;
use tracing::warn;

use crate::ActionConfigurationRepository;

/// Resolves the active configuration for an operation.
#[derive(Clone)]
pub struct ActionConfigurationService {
    repository: Arc<dyn ActionConfigurationRepository>,
}

impl ActionConfigurationService {
    /// Creates a resolver over a configuration repository.
    #[must_use]
    pub fn new(repository: Arc<dyn ActionConfigurationRepository>) -> Self {
        Self { repository }
    }

    /// Returns the active configuration for `operation`.
    ///
    /// When several configurations are active, the earliest created one wins,
    /// ties broken by configuration id.
    pub async fn resolve(&self, operation: &str) -> AppResult<ActionConfiguration> {
        let candidates = self.repository.list_active_configurations(operation).await?;

        if candidates.len() > 1 {
            warn!(
                operation = operation,
                candidate_count = candidates.len(),
                "multiple active configurations for operation, using the earliest"
            );
        }

        candidates
            .into_iter()
            .filter(|configuration| {
                configuration.is_active() && configuration.operation().as_str() == operation
            })
            .min_by(|left, right| {
                left.created_on()
                    .cmp(&right.created_on())
                    .then_with(|| left.configuration_id().cmp(&right.configuration_id()))
            })
            .ok_or_else(|| AppError::ConfigurationNotFound(operation.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use porta_core::{ActionConfigurationId, AppError, AppResult};
    use porta_domain::{ActionConfiguration, ActionConfigurationInput, ActionType};
    use uuid::Uuid;

    use super::ActionConfigurationService;
    use crate::ActionConfigurationRepository;

    struct FakeConfigurationRepository {
        configurations: Vec<ActionConfiguration>,
    }

    #[async_trait]
    impl ActionConfigurationRepository for FakeConfigurationRepository {
        async fn list_active_configurations(
            &self,
            operation: &str,
        ) -> AppResult<Vec<ActionConfiguration>> {
            Ok(self
                .configurations
                .iter()
                .filter(|configuration| configuration.operation().as_str() == operation)
                .cloned()
                .collect())
        }
    }

    fn configuration(
        operation: &str,
        configuration_id: ActionConfigurationId,
        age_minutes: i64,
        is_active: bool,
    ) -> ActionConfiguration {
        ActionConfiguration::new(ActionConfigurationInput {
            configuration_id,
            operation: operation.to_owned(),
            action_type: ActionType::CustomApi,
            custom_api: Some("porta_Greeter".to_owned()),
            contact_id_parameter: None,
            contact_reference_parameter: None,
            restricted_to_authenticated: false,
            restricted_to_web_roles: false,
            allowed_web_roles: BTreeSet::new(),
            is_active,
            created_on: Utc::now() - Duration::minutes(age_minutes),
        })
        .unwrap_or_else(|_| unreachable!())
    }

    fn service(configurations: Vec<ActionConfiguration>) -> ActionConfigurationService {
        ActionConfigurationService::new(Arc::new(FakeConfigurationRepository { configurations }))
    }

    #[tokio::test]
    async fn resolve_returns_matching_configuration() {
        let id = ActionConfigurationId::new();
        let resolved = service(vec![
            configuration("greet", id, 1, true),
            configuration("other", ActionConfigurationId::new(), 2, true),
        ])
        .resolve("greet")
        .await;

        assert_eq!(resolved.map(|value| value.configuration_id()).ok(), Some(id));
    }

    #[tokio::test]
    async fn resolve_fails_with_configuration_not_found() {
        let resolved = service(Vec::new()).resolve("X").await;

        assert!(matches!(
            resolved,
            Err(AppError::ConfigurationNotFound(operation)) if operation == "X"
        ));
    }

    #[tokio::test]
    async fn resolve_ignores_inactive_configurations() {
        let resolved = service(vec![configuration(
            "greet",
            ActionConfigurationId::new(),
            1,
            false,
        )])
        .resolve("greet")
        .await;

        assert!(matches!(resolved, Err(AppError::ConfigurationNotFound(_))));
    }

    #[tokio::test]
    async fn resolve_prefers_earliest_created_configuration() {
        let oldest = ActionConfigurationId::new();
        let resolved = service(vec![
            configuration("greet", ActionConfigurationId::new(), 5, true),
            configuration("greet", oldest, 60, true),
            configuration("greet", ActionConfigurationId::new(), 30, true),
        ])
        .resolve("greet")
        .await;

        assert_eq!(
            resolved.map(|value| value.configuration_id()).ok(),
            Some(oldest)
        );
    }

    #[tokio::test]
    async fn resolve_breaks_timestamp_ties_by_id() {
        let created_on = Utc::now();
        let low = ActionConfigurationId::from_uuid(Uuid::from_u128(1));
        let high = ActionConfigurationId::from_uuid(Uuid::from_u128(2));
        let build = |configuration_id| {
            ActionConfiguration::new(ActionConfigurationInput {
                configuration_id,
                operation: "greet".to_owned(),
                action_type: ActionType::CustomApi,
                custom_api: Some("porta_Greeter".to_owned()),
                contact_id_parameter: None,
                contact_reference_parameter: None,
                restricted_to_authenticated: false,
                restricted_to_web_roles: false,
                allowed_web_roles: BTreeSet::new(),
                is_active: true,
                created_on,
            })
            .unwrap_or_else(|_| unreachable!())
        };

        let resolved = service(vec![build(high), build(low)]).resolve("greet").await;

        assert_eq!(resolved.map(|value| value.configuration_id()).ok(), Some(low));
    }
}
