use std::collections::BTreeMap;

use async_trait::async_trait;
use porta_core::AppResult;
use porta_domain::TypedValue;

/// Named custom API invocation with typed parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomApiRequest {
    /// Custom API unique name.
    pub name: String,
    /// Parameters keyed by name without hint suffixes.
    pub parameters: BTreeMap<String, TypedValue>,
}

/// Output parameters returned by one custom API.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CustomApiResponse {
    /// Outputs keyed by parameter name.
    pub outputs: BTreeMap<String, TypedValue>,
}

/// Port for executing custom APIs on the platform.
#[async_trait]
pub trait CustomApiExecutor: Send + Sync {
    /// Executes one custom API request.
    async fn execute(&self, request: CustomApiRequest) -> AppResult<CustomApiResponse>;
}
