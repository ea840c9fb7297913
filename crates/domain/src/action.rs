use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use porta_core::{
    ActionConfigurationId, AppError, AppResult, ContactId, NonEmptyString, WebRoleId,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::attribute_hint::HINT_DELIMITER;
use crate::trigger::ActionTrigger;
use crate::typed_value::EntityReference;

/// Logical name of portal contact records.
pub const CONTACT_LOGICAL_NAME: &str = "contact";

/// Dispatch behavior of one action configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionType {
    /// Invokes a named custom API.
    CustomApi,
    /// Stored tag this runtime cannot dispatch.
    Unknown(String),
}

impl ActionType {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::CustomApi => "custom_api",
            Self::Unknown(tag) => tag.as_str(),
        }
    }

    /// Parses a storage value, preserving unknown tags.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "custom_api" => Self::CustomApi,
            other => Self::Unknown(other.to_owned()),
        }
    }
}

/// Input payload used to construct a validated action configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionConfigurationInput {
    /// Stable record identifier.
    pub configuration_id: ActionConfigurationId,
    /// Operation key callers use to select this configuration.
    pub operation: String,
    /// Dispatch behavior.
    pub action_type: ActionType,
    /// Custom API invoked for `CustomApi` configurations.
    pub custom_api: Option<String>,
    /// Parameter receiving the caller's contact id.
    pub contact_id_parameter: Option<String>,
    /// Parameter receiving the caller's contact reference.
    pub contact_reference_parameter: Option<String>,
    /// Rejects anonymous callers.
    pub restricted_to_authenticated: bool,
    /// Requires one of `allowed_web_roles`.
    pub restricted_to_web_roles: bool,
    /// Roles allowed when restricted to web roles.
    pub allowed_web_roles: BTreeSet<WebRoleId>,
    /// Only active configurations resolve.
    pub is_active: bool,
    /// Creation timestamp used as resolution tie-break.
    pub created_on: DateTime<Utc>,
}

/// Persisted description of how an operation is authorized and dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionConfiguration {
    configuration_id: ActionConfigurationId,
    operation: NonEmptyString,
    action_type: ActionType,
    custom_api: Option<NonEmptyString>,
    contact_id_parameter: Option<String>,
    contact_reference_parameter: Option<String>,
    restricted_to_authenticated: bool,
    restricted_to_web_roles: bool,
    allowed_web_roles: BTreeSet<WebRoleId>,
    is_active: bool,
    created_on: DateTime<Utc>,
}

impl ActionConfiguration {
    /// Creates a validated action configuration.
    pub fn new(input: ActionConfigurationInput) -> AppResult<Self> {
        let ActionConfigurationInput {
            configuration_id,
            operation,
            action_type,
            custom_api,
            contact_id_parameter,
            contact_reference_parameter,
            restricted_to_authenticated,
            restricted_to_web_roles,
            allowed_web_roles,
            is_active,
            created_on,
        } = input;

        let custom_api = custom_api
            .filter(|value| !value.trim().is_empty())
            .map(|value| NonEmptyString::new(value.trim()))
            .transpose()?;

        if action_type == ActionType::CustomApi && custom_api.is_none() {
            return Err(AppError::Validation(format!(
                "custom_api action configuration '{}' requires a custom API name",
                operation.trim()
            )));
        }

        Ok(Self {
            configuration_id,
            operation: NonEmptyString::new(operation.trim())?,
            action_type,
            custom_api,
            contact_id_parameter: normalize_parameter_name(contact_id_parameter)?,
            contact_reference_parameter: normalize_parameter_name(contact_reference_parameter)?,
            restricted_to_authenticated,
            restricted_to_web_roles,
            allowed_web_roles,
            is_active,
            created_on,
        })
    }

    /// Returns configuration identifier.
    #[must_use]
    pub fn configuration_id(&self) -> ActionConfigurationId {
        self.configuration_id
    }

    /// Returns operation key.
    #[must_use]
    pub fn operation(&self) -> &NonEmptyString {
        &self.operation
    }

    /// Returns dispatch behavior.
    #[must_use]
    pub fn action_type(&self) -> &ActionType {
        &self.action_type
    }

    /// Returns custom API name.
    #[must_use]
    pub fn custom_api(&self) -> Option<&str> {
        self.custom_api.as_ref().map(NonEmptyString::as_str)
    }

    /// Returns parameter receiving the caller's contact id.
    #[must_use]
    pub fn contact_id_parameter(&self) -> Option<&str> {
        self.contact_id_parameter.as_deref()
    }

    /// Returns parameter receiving the caller's contact reference.
    #[must_use]
    pub fn contact_reference_parameter(&self) -> Option<&str> {
        self.contact_reference_parameter.as_deref()
    }

    /// Returns whether anonymous callers are rejected.
    #[must_use]
    pub fn restricted_to_authenticated(&self) -> bool {
        self.restricted_to_authenticated
    }

    /// Returns whether callers need a matching web role.
    #[must_use]
    pub fn restricted_to_web_roles(&self) -> bool {
        self.restricted_to_web_roles
    }

    /// Returns roles allowed to invoke the action.
    #[must_use]
    pub fn allowed_web_roles(&self) -> &BTreeSet<WebRoleId> {
        &self.allowed_web_roles
    }

    /// Returns whether the configuration is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns creation timestamp.
    #[must_use]
    pub fn created_on(&self) -> DateTime<Utc> {
        self.created_on
    }
}

fn normalize_parameter_name(value: Option<String>) -> AppResult<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if trimmed.contains(HINT_DELIMITER) {
        return Err(AppError::Validation(format!(
            "parameter name '{trimmed}' must not contain '{HINT_DELIMITER}'"
        )));
    }

    Ok(Some(trimmed.to_owned()))
}

/// Identity of the caller invoking an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallerContext {
    contact_id: Option<ContactId>,
}

impl CallerContext {
    /// Creates a context for an anonymous caller.
    #[must_use]
    pub fn anonymous() -> Self {
        Self { contact_id: None }
    }

    /// Creates a context for a signed-in contact.
    #[must_use]
    pub fn for_contact(contact_id: ContactId) -> Self {
        Self {
            contact_id: Some(contact_id),
        }
    }

    /// Returns the caller's contact id.
    #[must_use]
    pub fn contact_id(&self) -> Option<ContactId> {
        self.contact_id
    }

    /// Returns whether the caller has no contact identity.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.contact_id.is_none()
    }

    /// Returns the caller's contact as a record reference.
    #[must_use]
    pub fn contact_reference(&self) -> Option<EntityReference> {
        self.contact_id
            .map(|contact_id| EntityReference::new(CONTACT_LOGICAL_NAME, contact_id.as_uuid()))
    }
}

/// Lifecycle status of one action invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationStatus {
    /// Invocation has not finished.
    Active,
    /// Outputs hold the custom API result.
    Success,
    /// Outputs hold `{ "message": … }`.
    Error,
}

impl InvocationStatus {
    /// Returns stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Result record for one trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionInvocation {
    invocation_id: Uuid,
    created_on: DateTime<Utc>,
    operation: Option<String>,
    inputs: Option<String>,
    contact: Option<EntityReference>,
    configuration_id: Option<ActionConfigurationId>,
    status: InvocationStatus,
    outputs: String,
}

impl ActionInvocation {
    /// Starts an active invocation for a trigger.
    #[must_use]
    pub fn start(trigger: &ActionTrigger) -> Self {
        Self {
            invocation_id: Uuid::new_v4(),
            created_on: Utc::now(),
            operation: trigger.operation().map(ToOwned::to_owned),
            inputs: trigger.inputs().map(ToOwned::to_owned),
            contact: None,
            configuration_id: None,
            status: InvocationStatus::Active,
            outputs: String::new(),
        }
    }

    /// Records the resolved configuration.
    pub fn bind_configuration(&mut self, configuration_id: ActionConfigurationId) {
        self.configuration_id = Some(configuration_id);
    }

    /// Records the caller's contact.
    pub fn bind_caller(&mut self, caller: &CallerContext) {
        self.contact = caller.contact_reference();
    }

    /// Completes the invocation with encoded outputs.
    pub fn succeed(&mut self, outputs: String) {
        self.outputs = outputs;
        self.status = InvocationStatus::Success;
    }

    /// Completes the invocation with an error message.
    pub fn fail(&mut self, message: &str) {
        let payload = json!({ "message": message });
        self.outputs =
            serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string());
        self.status = InvocationStatus::Error;
    }

    /// Returns invocation identifier.
    #[must_use]
    pub fn invocation_id(&self) -> Uuid {
        self.invocation_id
    }

    /// Returns creation timestamp.
    #[must_use]
    pub fn created_on(&self) -> DateTime<Utc> {
        self.created_on
    }

    /// Returns requested operation.
    #[must_use]
    pub fn operation(&self) -> Option<&str> {
        self.operation.as_deref()
    }

    /// Returns raw input text.
    #[must_use]
    pub fn inputs(&self) -> Option<&str> {
        self.inputs.as_deref()
    }

    /// Returns caller contact reference.
    #[must_use]
    pub fn contact(&self) -> Option<&EntityReference> {
        self.contact.as_ref()
    }

    /// Returns resolved configuration identifier.
    #[must_use]
    pub fn configuration_id(&self) -> Option<ActionConfigurationId> {
        self.configuration_id
    }

    /// Returns current status.
    #[must_use]
    pub fn status(&self) -> InvocationStatus {
        self.status
    }

    /// Returns encoded outputs.
    #[must_use]
    pub fn outputs(&self) -> &str {
        self.outputs.as_str()
    }
}
