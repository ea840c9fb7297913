use std::collections::BTreeMap;
use std::sync::Arc;

use porta_core::{AppError, AppResult};
use porta_domain::{
    ActionConfiguration, ActionInvocation, ActionTrigger, ActionType, CallerContext, TypedValue,
};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::{
    ActionAuthorizationGate, ActionConfigurationService, CustomApiExecutor, CustomApiRequest,
    ValueConversionService,
};

mod dispatch;
mod inputs;
mod outputs;

use inputs::inject_caller_parameters;
use outputs::encode_outputs;


/// Runs portal action triggers against their configured custom APIs.
#[derive(Clone)]
pub struct ActionDispatchService {
    configuration_service: ActionConfigurationService,
    authorization_gate: ActionAuthorizationGate,
    conversion_service: ValueConversionService,
    executor: Arc<dyn CustomApiExecutor>,
}

impl ActionDispatchService {
    /// Creates a dispatcher from its collaborators.
    #[must_use]
    pub fn new(
        configuration_service: ActionConfigurationService,
        authorization_gate: ActionAuthorizationGate,
        executor: Arc<dyn CustomApiExecutor>,
    ) -> Self {
        Self {
            configuration_service,
            authorization_gate,
            conversion_service: ValueConversionService::new(),
            executor,
        }
    }
}
