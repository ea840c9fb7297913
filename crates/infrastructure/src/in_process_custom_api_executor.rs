use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use porta_application::{CustomApiExecutor, CustomApiRequest, CustomApiResponse};
use porta_core::{AppError, AppResult};
use porta_domain::TypedValue;
use tracing::debug;

/// Custom API implemented inside this process.
#[async_trait]
pub trait CustomApiHandler: Send + Sync {
    /// Handles one invocation and returns its output parameters.
    async fn handle(
        &self,
        parameters: &BTreeMap<String, TypedValue>,
    ) -> AppResult<BTreeMap<String, TypedValue>>;
}

/// Executes custom APIs from a registry of in-process handlers.
#[derive(Clone, Default)]
pub struct InProcessCustomApiExecutor {
    handlers: HashMap<String, Arc<dyn CustomApiHandler>>,
}

impl InProcessCustomApiExecutor {
    /// Creates an executor without handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler under a custom API name.
    #[must_use]
    pub fn with_handler(
        mut self,
        name: impl Into<String>,
        handler: Arc<dyn CustomApiHandler>,
    ) -> Self {
        self.handlers.insert(name.into(), handler);
        self
    }
}

#[async_trait]
impl CustomApiExecutor for InProcessCustomApiExecutor {
    async fn execute(&self, request: CustomApiRequest) -> AppResult<CustomApiResponse> {
        let handler = self.handlers.get(&request.name).ok_or_else(|| {
            AppError::Downstream(format!("custom API '{}' is not registered", request.name))
        })?;

        debug!(
            custom_api = request.name.as_str(),
            parameter_count = request.parameters.len(),
            "invoking in-process custom API"
        );
        let outputs = handler.handle(&request.parameters).await?;

        Ok(CustomApiResponse { outputs })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use porta_application::{CustomApiExecutor, CustomApiRequest};
    use porta_core::{AppError, AppResult};
    use porta_domain::TypedValue;

    use super::{CustomApiHandler, InProcessCustomApiExecutor};

    struct EchoHandler;

    #[async_trait]
    impl CustomApiHandler for EchoHandler {
        async fn handle(
            &self,
            parameters: &BTreeMap<String, TypedValue>,
        ) -> AppResult<BTreeMap<String, TypedValue>> {
            Ok(parameters.clone())
        }
    }

    #[tokio::test]
    async fn registered_handler_receives_parameters() {
        let executor =
            InProcessCustomApiExecutor::new().with_handler("echo", Arc::new(EchoHandler));
        let parameters = BTreeMap::from([("Text".to_owned(), TypedValue::Text("hi".to_owned()))]);

        let response = executor
            .execute(CustomApiRequest {
                name: "echo".to_owned(),
                parameters: parameters.clone(),
            })
            .await;

        assert_eq!(response.map(|value| value.outputs).ok(), Some(parameters));
    }

    #[tokio::test]
    async fn unknown_custom_api_is_downstream_failure() {
        let result = InProcessCustomApiExecutor::new()
            .execute(CustomApiRequest {
                name: "missing".to_owned(),
                parameters: BTreeMap::new(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Downstream(_))));
    }
}
