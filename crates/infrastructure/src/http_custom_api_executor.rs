use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use porta_application::{CustomApiExecutor, CustomApiRequest, CustomApiResponse};
use porta_core::{AppError, AppResult};
use porta_domain::TypedValue;
use serde_json::{Map, Value};
use tracing::{debug, warn};

#[cfg(test)]
mod tests;

/// HTTP-based implementation for custom API execution.
///
/// Each request is posted as a JSON object to `<base_url>/<custom api name>`.
pub struct HttpCustomApiExecutor {
    http_client: reqwest::Client,
    base_url: String,
    max_attempts: u8,
    retry_backoff_ms: u64,
}

impl HttpCustomApiExecutor {
    /// Creates a new custom API executor.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        base_url: impl Into<String>,
        max_attempts: u8,
        retry_backoff_ms: u64,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            max_attempts: max_attempts.max(1),
            retry_backoff_ms: retry_backoff_ms.max(50),
        }
    }

    fn endpoint(&self, custom_api: &str) -> String {
        format!("{}/{}", self.base_url, custom_api)
    }

    async fn execute_with_retry(&self, custom_api: &str, body: &Value) -> AppResult<Value> {
        let endpoint = self.endpoint(custom_api);
        let mut attempt = 0_u8;
        let mut last_error: Option<String> = None;

        while attempt < self.max_attempts {
            attempt = attempt.saturating_add(1);
            debug!(
                custom_api = custom_api,
                attempt = attempt,
                "invoking custom API over HTTP"
            );
            let response = self.http_client.post(&endpoint).json(body).send().await;

            match response {
                Ok(response) if response.status().is_success() => {
                    let text = response.text().await.map_err(|error| {
                        AppError::Downstream(format!(
                            "custom API '{custom_api}' response body unavailable: {error}"
                        ))
                    })?;
                    return parse_response_body(custom_api, text.as_str());
                }
                Ok(response)
                    if response.status().is_server_error()
                        || response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS =>
                {
                    last_error = Some(format!(
                        "transient HTTP status {} from custom API '{custom_api}'",
                        response.status()
                    ));
                }
                Ok(response) => {
                    let status = response.status();
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "<response body unavailable>".to_owned());
                    return Err(AppError::Downstream(format!(
                        "custom API '{custom_api}' failed with status {status}: {body}"
                    )));
                }
                Err(error) => {
                    last_error = Some(format!(
                        "custom API '{custom_api}' transport error: {error}"
                    ));
                }
            }

            if attempt < self.max_attempts {
                warn!(
                    custom_api = custom_api,
                    attempt = attempt,
                    error = last_error.as_deref().unwrap_or_default(),
                    "retrying custom API invocation"
                );
                let delay = self.retry_backoff_ms.saturating_mul(u64::from(attempt));
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
        }

        Err(AppError::Downstream(last_error.unwrap_or_else(|| {
            format!("custom API '{custom_api}' exhausted retries")
        })))
    }
}

fn encode_parameters(parameters: &BTreeMap<String, TypedValue>) -> Value {
    Value::Object(
        parameters
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect::<Map<String, Value>>(),
    )
}

/// Reads a response body into raw output values. An empty body has no outputs.
fn parse_response_body(custom_api: &str, text: &str) -> AppResult<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    serde_json::from_str(text).map_err(|error| {
        AppError::Downstream(format!(
            "custom API '{custom_api}' returned invalid JSON: {error}"
        ))
    })
}

fn decode_outputs(custom_api: &str, body: Value) -> AppResult<BTreeMap<String, TypedValue>> {
    let Value::Object(fields) = body else {
        return Err(AppError::Downstream(format!(
            "custom API '{custom_api}' must return a JSON object"
        )));
    };

    Ok(fields
        .into_iter()
        .map(|(name, value)| (name, TypedValue::Raw(value)))
        .collect())
}

#[async_trait]
impl CustomApiExecutor for HttpCustomApiExecutor {
    async fn execute(&self, request: CustomApiRequest) -> AppResult<CustomApiResponse> {
        let body = encode_parameters(&request.parameters);
        let response = self.execute_with_retry(&request.name, &body).await?;

        Ok(CustomApiResponse {
            outputs: decode_outputs(&request.name, response)?,
        })
    }
}
