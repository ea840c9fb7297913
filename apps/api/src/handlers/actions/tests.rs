use axum::Json;
use axum::extract::{Extension, Query, State};
use porta_core::{AppError, ContactId};
use porta_domain::CallerContext;
use serde_json::{Value, json};

use super::{invoke_action_handler, query_portal_actions_handler};
use crate::api_config::ApiConfig;
use crate::api_services::build_app_state;
use crate::dev_seed::DEV_SEED_CONTACT_ID;
use crate::dto::{InvokeActionRequest, PortalActionQuery};
use crate::error::ApiError;
use crate::state::AppState;

async fn state() -> AppState {
    let config = ApiConfig::from_lookup(false, |_| None).unwrap_or_else(|_| unreachable!());
    build_app_state(&config)
        .await
        .unwrap_or_else(|_| unreachable!())
}

fn seeded_contact() -> CallerContext {
    ContactId::parse_optional(DEV_SEED_CONTACT_ID)
        .ok()
        .flatten()
        .map_or_else(CallerContext::anonymous, CallerContext::for_contact)
}

fn query(filter: &str) -> Query<PortalActionQuery> {
    Query(PortalActionQuery {
        filter: Some(filter.to_owned()),
    })
}

fn parse_outputs(outputs: &str) -> Value {
    serde_json::from_str(outputs).unwrap_or_else(|_| unreachable!())
}

#[tokio::test]
async fn portal_query_dispatches_greeter_for_contact() {
    let response = query_portal_actions_handler(
        State(state().await),
        Extension(seeded_contact()),
        query(concat!(
            "createdon ge 2024-08-03T15:27:41.000Z and operation eq 'porta_Greeter' ",
            "and inputs eq '{\"Text\":\"Hello {FullName}\"}'",
        )),
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    assert_eq!(response.0.value.len(), 1);
    let invocation = &response.0.value[0];
    assert_eq!(invocation.status, "success");
    assert_eq!(invocation.contact_id.as_deref(), Some(DEV_SEED_CONTACT_ID));
    assert_eq!(
        parse_outputs(&invocation.outputs),
        json!({"Text": "Hello Ada Lovelace"})
    );
}

#[tokio::test]
async fn portal_query_without_operation_returns_no_records() {
    let response = query_portal_actions_handler(
        State(state().await),
        Extension(CallerContext::anonymous()),
        Query(PortalActionQuery { filter: None }),
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    assert!(response.0.value.is_empty());
}

#[tokio::test]
async fn filter_contact_cannot_impersonate_caller() {
    let result = query_portal_actions_handler(
        State(state().await),
        Extension(CallerContext::anonymous()),
        query(&format!(
            "operation eq 'porta_GreeterBound' and contact_id eq {DEV_SEED_CONTACT_ID}"
        )),
    )
    .await;

    assert!(matches!(result, Err(ApiError(AppError::Unauthorized(_)))));
}

#[tokio::test]
async fn unknown_operation_is_configuration_not_found() {
    let result = query_portal_actions_handler(
        State(state().await),
        Extension(CallerContext::anonymous()),
        query("operation eq 'X' and inputs eq '{}'"),
    )
    .await;

    assert!(matches!(
        result,
        Err(ApiError(AppError::ConfigurationNotFound(operation))) if operation == "X"
    ));
}

#[tokio::test]
async fn malformed_filter_is_rejected() {
    let result = query_portal_actions_handler(
        State(state().await),
        Extension(CallerContext::anonymous()),
        query("operation eq 'porta_Greeter' or operation eq 'x'"),
    )
    .await;

    assert!(matches!(result, Err(ApiError(AppError::Validation(_)))));
}

#[tokio::test]
async fn deeply_nested_filter_is_rejected() {
    let depth = 10_000;
    let result = query_portal_actions_handler(
        State(state().await),
        Extension(CallerContext::anonymous()),
        query(&format!(
            "{}operation eq 'porta_Greeter'{}",
            "(".repeat(depth),
            ")".repeat(depth)
        )),
    )
    .await;

    assert!(matches!(result, Err(ApiError(AppError::Validation(_)))));
}

#[tokio::test]
async fn invoke_accepts_object_inputs_for_role_member() {
    let response = invoke_action_handler(
        State(state().await),
        Extension(seeded_contact()),
        Json(InvokeActionRequest {
            operation: "porta_ParamReturner".to_owned(),
            inputs: Some(json!({"Count@int": "3", "Amount": {"Money": 7.8}})),
        }),
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    assert_eq!(response.0.status, "success");
    assert_eq!(
        parse_outputs(&response.0.outputs),
        json!({"Amount": {"Money": 7.8}, "Count": 3})
    );
}

#[tokio::test]
async fn invoke_rejects_anonymous_caller_without_role() {
    let result = invoke_action_handler(
        State(state().await),
        Extension(CallerContext::anonymous()),
        Json(InvokeActionRequest {
            operation: "porta_ParamReturner".to_owned(),
            inputs: Some(json!("{}")),
        }),
    )
    .await;

    assert!(matches!(result, Err(ApiError(AppError::Unauthorized(_)))));
}

#[tokio::test]
async fn invoke_rejects_non_object_inputs() {
    let result = invoke_action_handler(
        State(state().await),
        Extension(seeded_contact()),
        Json(InvokeActionRequest {
            operation: "porta_Greeter".to_owned(),
            inputs: Some(json!([1, 2])),
        }),
    )
    .await;

    assert!(matches!(result, Err(ApiError(AppError::Validation(_)))));
}

#[tokio::test]
async fn invoke_captures_custom_api_failures() {
    let response = invoke_action_handler(
        State(state().await),
        Extension(seeded_contact()),
        Json(InvokeActionRequest {
            operation: "porta_Greeter".to_owned(),
            inputs: Some(json!({"Text": 5})),
        }),
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    assert_eq!(response.0.status, "error");
    assert!(parse_outputs(&response.0.outputs)["message"].is_string());
}
