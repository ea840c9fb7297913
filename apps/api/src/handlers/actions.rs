use axum::Json;
use axum::extract::{Extension, Query, State};
use porta_core::AppError;
use porta_domain::{ActionTrigger, CallerContext, TriggerFilter};
use serde_json::Value;
use tracing::debug;

use crate::dto::{
    ActionInvocationResponse, InvokeActionRequest, PortalActionListResponse, PortalActionQuery,
};
use crate::error::ApiResult;
use crate::state::AppState;

#[cfg(test)]
mod tests;

/// Decodes the portal client's `$filter` query and dispatches the action.
///
/// The trusted caller context replaces any contact id carried in the filter.
pub async fn query_portal_actions_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Query(query): Query<PortalActionQuery>,
) -> ApiResult<Json<PortalActionListResponse>> {
    let filter = TriggerFilter::parse_odata(query.filter.as_deref().unwrap_or_default())?;
    let trigger = ActionTrigger::from_filter(&filter).with_contact_id(caller.contact_id());

    if trigger.operation().is_none() {
        debug!("portal query carries no operation");
        return Ok(Json(PortalActionListResponse { value: Vec::new() }));
    }

    let invocation = state.action_dispatch_service.dispatch(&trigger).await?;

    Ok(Json(PortalActionListResponse {
        value: vec![ActionInvocationResponse::from(invocation)],
    }))
}

pub async fn invoke_action_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Json(payload): Json<InvokeActionRequest>,
) -> ApiResult<Json<ActionInvocationResponse>> {
    let inputs = match payload.inputs {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(object @ Value::Object(_)) => Some(object.to_string()),
        Some(_) => {
            return Err(AppError::Validation(
                "inputs must be a JSON object or a JSON string".to_owned(),
            )
            .into());
        }
    };

    let trigger =
        ActionTrigger::new(Some(payload.operation), inputs).with_contact_id(caller.contact_id());
    let invocation = state.action_dispatch_service.dispatch(&trigger).await?;

    Ok(Json(ActionInvocationResponse::from(invocation)))
}
