use std::collections::BTreeSet;

use chrono::Utc;
use porta_application::{ActionConfigurationRepository, ContactRoleRepository};
use porta_core::{ActionConfigurationId, AppError, ContactId, WebRoleId};
use porta_domain::{ActionConfiguration, ActionConfigurationInput, ActionType};
use uuid::Uuid;

use super::InMemoryActionRepository;

fn configuration(operation: &str, is_active: bool) -> ActionConfiguration {
    ActionConfiguration::new(ActionConfigurationInput {
        configuration_id: ActionConfigurationId::new(),
        operation: operation.to_owned(),
        action_type: ActionType::CustomApi,
        custom_api: Some("porta_Greeter".to_owned()),
        contact_id_parameter: None,
        contact_reference_parameter: None,
        restricted_to_authenticated: false,
        restricted_to_web_roles: false,
        allowed_web_roles: BTreeSet::new(),
        is_active,
        created_on: Utc::now(),
    })
    .unwrap_or_else(|_| unreachable!())
}

#[tokio::test]
async fn insert_and_list_active_configurations() {
    let repository = InMemoryActionRepository::new();

    assert!(
        repository
            .insert_configuration(configuration("greet", true))
            .await
            .is_ok()
    );
    assert!(
        repository
            .insert_configuration(configuration("greet", false))
            .await
            .is_ok()
    );
    assert!(
        repository
            .insert_configuration(configuration("other", true))
            .await
            .is_ok()
    );

    let listed = repository.list_active_configurations("greet").await;
    assert!(listed.is_ok());
    assert_eq!(listed.unwrap_or_default().len(), 1);
}

#[tokio::test]
async fn second_active_configuration_for_operation_conflicts() {
    let repository = InMemoryActionRepository::new();

    assert!(
        repository
            .insert_configuration(configuration("greet", true))
            .await
            .is_ok()
    );
    let result = repository
        .insert_configuration(configuration("greet", true))
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn duplicate_configuration_id_conflicts() {
    let repository = InMemoryActionRepository::new();
    let first = configuration("greet", false);

    assert!(repository.insert_configuration(first.clone()).await.is_ok());
    let result = repository.insert_configuration(first).await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn web_roles_are_listed_per_contact() {
    let repository = InMemoryActionRepository::new();
    let contact_id = ContactId::from_uuid(Uuid::new_v4());
    let other_contact = ContactId::from_uuid(Uuid::new_v4());
    let role = WebRoleId::new();

    repository.assign_web_role(contact_id, role).await;
    repository.assign_web_role(contact_id, role).await;

    let roles = repository.list_web_roles_for_contact(contact_id).await;
    assert_eq!(roles.unwrap_or_default(), vec![role]);

    let other_roles = repository.list_web_roles_for_contact(other_contact).await;
    assert!(other_roles.unwrap_or_default().is_empty());
}
