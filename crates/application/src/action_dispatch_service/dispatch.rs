use super::*;

impl ActionDispatchService {
    /// Dispatches one trigger and returns its invocation record.
    ///
    /// Missing configuration, authorization failures and unsupported action
    /// types are returned as errors. Failures while converting inputs,
    /// invoking the custom API or encoding outputs are captured into an
    /// invocation with `Error` status.
    pub async fn dispatch(&self, trigger: &ActionTrigger) -> AppResult<ActionInvocation> {
        let mut invocation = ActionInvocation::start(trigger);

        let Some(operation) = trigger.operation() else {
            debug!("trigger carries no operation, nothing to dispatch");
            invocation.succeed(String::new());
            return Ok(invocation);
        };

        info!(
            operation = operation,
            invocation_id = %invocation.invocation_id(),
            "dispatching portal action"
        );

        let configuration = self.configuration_service.resolve(operation).await?;
        invocation.bind_configuration(configuration.configuration_id());

        let caller = trigger
            .contact_id()
            .map_or_else(CallerContext::anonymous, CallerContext::for_contact);
        invocation.bind_caller(&caller);

        self.authorization_gate
            .authorize(&caller, &configuration)
            .await?;

        let custom_api = match configuration.action_type() {
            ActionType::CustomApi => configuration.custom_api().ok_or_else(|| {
                AppError::Validation(format!(
                    "configuration for '{operation}' names no custom API"
                ))
            })?,
            ActionType::Unknown(tag) => {
                return Err(AppError::UnsupportedActionType(tag.clone()));
            }
        };

        match self
            .execute_custom_api(custom_api, &configuration, &caller, trigger.inputs())
            .await
        {
            Ok(outputs) => {
                invocation.succeed(outputs);
                info!(
                    operation = operation,
                    custom_api = custom_api,
                    invocation_id = %invocation.invocation_id(),
                    "portal action succeeded"
                );
            }
            Err(error) => {
                warn!(
                    error = %error,
                    operation = operation,
                    custom_api = custom_api,
                    invocation_id = %invocation.invocation_id(),
                    "portal action failed"
                );
                invocation.fail(error.message());
            }
        }

        Ok(invocation)
    }

    async fn execute_custom_api(
        &self,
        custom_api: &str,
        configuration: &ActionConfiguration,
        caller: &CallerContext,
        inputs: Option<&str>,
    ) -> AppResult<String> {
        let mut parameters = self.convert_inputs(inputs)?;
        inject_caller_parameters(&mut parameters, configuration, caller);

        for (name, value) in &parameters {
            debug!(
                custom_api = custom_api,
                parameter = name.as_str(),
                value_type = value.type_name(),
                "adding custom API parameter"
            );
        }

        let response = self
            .executor
            .execute(CustomApiRequest {
                name: custom_api.to_owned(),
                parameters,
            })
            .await?;

        encode_outputs(&response.outputs)
    }
}
