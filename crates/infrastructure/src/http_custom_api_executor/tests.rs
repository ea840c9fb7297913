use std::collections::BTreeMap;

use porta_core::AppError;
use porta_domain::{EntityReference, TypedValue};
use serde_json::{Value, json};
use uuid::Uuid;

use super::{HttpCustomApiExecutor, decode_outputs, encode_parameters, parse_response_body};

#[test]
fn endpoint_joins_base_url_and_api_name() {
    let executor = HttpCustomApiExecutor::new(
        reqwest::Client::new(),
        "http://localhost:7071/api/",
        0,
        0,
    );

    assert_eq!(
        executor.endpoint("porta_Greeter"),
        "http://localhost:7071/api/porta_Greeter"
    );
    assert_eq!(executor.max_attempts, 1);
    assert_eq!(executor.retry_backoff_ms, 50);
}

#[test]
fn parameters_encode_in_input_shapes() {
    let id = Uuid::nil();
    let parameters = BTreeMap::from([
        ("Count".to_owned(), TypedValue::Int32(3)),
        ("Level".to_owned(), TypedValue::OptionSet(2)),
        (
            "Target".to_owned(),
            TypedValue::EntityReference(EntityReference::new("contact", id)),
        ),
    ]);

    assert_eq!(
        encode_parameters(&parameters),
        json!({
            "Count": 3,
            "Level": {"OptionSetValue": 2},
            "Target": {"LogicalName": "contact", "Id": id.to_string()},
        })
    );
}

#[test]
fn object_responses_become_raw_outputs() {
    let outputs = decode_outputs("porta_Greeter", json!({"Result": "Hi", "Count": 1}))
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(
        outputs.get("Result"),
        Some(&TypedValue::Raw(Value::String("Hi".to_owned())))
    );
    assert_eq!(outputs.len(), 2);
}

#[test]
fn non_object_responses_are_downstream_failures() {
    assert!(matches!(
        decode_outputs("porta_Greeter", json!([1, 2])),
        Err(AppError::Downstream(_))
    ));
    assert!(matches!(
        parse_response_body("porta_Greeter", "not json"),
        Err(AppError::Downstream(_))
    ));
}

#[test]
fn empty_response_body_has_no_outputs() {
    let body = parse_response_body("porta_Greeter", "  ").unwrap_or_else(|_| unreachable!());
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn unreachable_endpoint_fails_after_retries() {
    let executor = HttpCustomApiExecutor::new(reqwest::Client::new(), "http://127.0.0.1:1", 2, 50);

    let result = executor.execute_with_retry("porta_Greeter", &json!({})).await;

    assert!(matches!(result, Err(AppError::Downstream(_))));
}
