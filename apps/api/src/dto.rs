use chrono::SecondsFormat;
use porta_domain::ActionInvocation;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Query string of the portal action endpoint.
#[derive(Debug, Deserialize)]
pub struct PortalActionQuery {
    #[serde(rename = "$filter")]
    pub filter: Option<String>,
}

/// Incoming payload for direct action invocation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/invoke-action-request.ts"
)]
pub struct InvokeActionRequest {
    pub operation: String,
    /// JSON object of inputs, or the same object as JSON text.
    #[serde(default)]
    #[ts(type = "Record<string, unknown> | string | null")]
    pub inputs: Option<Value>,
}

/// API representation of one action invocation.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/action-invocation-response.ts"
)]
pub struct ActionInvocationResponse {
    pub invocation_id: String,
    pub created_on: String,
    pub operation: Option<String>,
    pub inputs: Option<String>,
    pub contact_id: Option<String>,
    pub configuration_id: Option<String>,
    pub status: String,
    pub outputs: String,
}

impl From<ActionInvocation> for ActionInvocationResponse {
    fn from(value: ActionInvocation) -> Self {
        Self {
            invocation_id: value.invocation_id().to_string(),
            created_on: value
                .created_on()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            operation: value.operation().map(ToOwned::to_owned),
            inputs: value.inputs().map(ToOwned::to_owned),
            contact_id: value.contact().map(|contact| contact.id.to_string()),
            configuration_id: value
                .configuration_id()
                .map(|configuration_id| configuration_id.to_string()),
            status: value.status().as_str().to_owned(),
            outputs: value.outputs().to_owned(),
        }
    }
}

/// Collection envelope returned to the portal client.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/portal-action-list-response.ts"
)]
pub struct PortalActionListResponse {
    pub value: Vec<ActionInvocationResponse>,
}

#[cfg(test)]
mod tests {
    use super::{
        ActionInvocationResponse, HealthResponse, InvokeActionRequest, PortalActionListResponse,
    };

    use crate::error::ErrorResponse;
    use ts_rs::Config;
    use ts_rs::TS;

    #[test]
    fn export_ts_bindings() -> Result<(), ts_rs::ExportError> {
        let config = Config::default();

        ActionInvocationResponse::export(&config)?;
        ErrorResponse::export(&config)?;
        HealthResponse::export(&config)?;
        InvokeActionRequest::export(&config)?;
        PortalActionListResponse::export(&config)?;

        Ok(())
    }
}
