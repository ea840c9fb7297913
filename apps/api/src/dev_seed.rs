use std::collections::BTreeSet;

use chrono::Utc;
use porta_core::{ActionConfigurationId, AppError, AppResult, ContactId, WebRoleId};
use porta_domain::{ActionConfiguration, ActionConfigurationInput, ActionType};
use porta_infrastructure::InMemoryActionRepository;
use tracing::info;
use uuid::Uuid;

use crate::sample_custom_apis::{ContactDirectory, GREETER, GREETER_BOUND, PARAM_RETURNER};

pub const DEV_SEED_CONTACT_ID: &str = "4121902e-0530-ef11-8409-6045bd9e7366";
const DEV_SEED_CONTACT_FULL_NAME: &str = "Ada Lovelace";
const DEV_SEED_MEMBER_ROLE_ID: &str = "8f1d3c52-0b7a-4e0e-9c55-3b2a61c0a7d4";

/// Contacts known to the sample custom APIs.
pub fn sample_contact_directory() -> AppResult<ContactDirectory> {
    let contact_id = parse_uuid_const(DEV_SEED_CONTACT_ID, "DEV_SEED_CONTACT_ID")?;
    Ok(ContactDirectory::from([(
        contact_id,
        DEV_SEED_CONTACT_FULL_NAME.to_owned(),
    )]))
}

/// Seeds one configuration per sample custom API and the sample contact's role.
pub async fn seed_sample_actions(repository: &InMemoryActionRepository) -> AppResult<()> {
    let contact_id = ContactId::from_uuid(parse_uuid_const(
        DEV_SEED_CONTACT_ID,
        "DEV_SEED_CONTACT_ID",
    )?);
    let member_role = WebRoleId::from_uuid(parse_uuid_const(
        DEV_SEED_MEMBER_ROLE_ID,
        "DEV_SEED_MEMBER_ROLE_ID",
    )?);

    repository
        .insert_configuration(sample_configuration(SampleAction {
            custom_api: GREETER,
            contact_id_parameter: Some("ContactId"),
            contact_reference_parameter: Some("ContactReference"),
            restricted_to_authenticated: false,
            allowed_web_roles: None,
        })?)
        .await?;
    repository
        .insert_configuration(sample_configuration(SampleAction {
            custom_api: GREETER_BOUND,
            contact_id_parameter: None,
            contact_reference_parameter: Some("Target"),
            restricted_to_authenticated: true,
            allowed_web_roles: None,
        })?)
        .await?;
    repository
        .insert_configuration(sample_configuration(SampleAction {
            custom_api: PARAM_RETURNER,
            contact_id_parameter: None,
            contact_reference_parameter: None,
            restricted_to_authenticated: false,
            allowed_web_roles: Some(BTreeSet::from([member_role])),
        })?)
        .await?;
    repository.assign_web_role(contact_id, member_role).await;

    info!(
        contact_id = %contact_id,
        "seeded sample portal actions"
    );
    Ok(())
}

struct SampleAction {
    custom_api: &'static str,
    contact_id_parameter: Option<&'static str>,
    contact_reference_parameter: Option<&'static str>,
    restricted_to_authenticated: bool,
    allowed_web_roles: Option<BTreeSet<WebRoleId>>,
}

fn sample_configuration(action: SampleAction) -> AppResult<ActionConfiguration> {
    ActionConfiguration::new(ActionConfigurationInput {
        configuration_id: ActionConfigurationId::new(),
        operation: action.custom_api.to_owned(),
        action_type: ActionType::CustomApi,
        custom_api: Some(action.custom_api.to_owned()),
        contact_id_parameter: action.contact_id_parameter.map(ToOwned::to_owned),
        contact_reference_parameter: action.contact_reference_parameter.map(ToOwned::to_owned),
        restricted_to_authenticated: action.restricted_to_authenticated,
        restricted_to_web_roles: action.allowed_web_roles.is_some(),
        allowed_web_roles: action.allowed_web_roles.unwrap_or_default(),
        is_active: true,
        created_on: Utc::now(),
    })
}

fn parse_uuid_const(value: &str, name: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|error| AppError::Internal(format!("invalid {name} constant '{value}': {error}")))
}
