use super::*;

/// Characters the transport may wrap around the input text.
const INPUT_WRAPPER: char = '%';

impl ActionDispatchService {
    /// Parses raw input text into named custom API parameters.
    ///
    /// Absent or blank input yields no parameters.
    pub(super) fn convert_inputs(
        &self,
        inputs: Option<&str>,
    ) -> AppResult<BTreeMap<String, TypedValue>> {
        let Some(text) = inputs
            .map(|value| value.trim().trim_matches(INPUT_WRAPPER).trim())
            .filter(|value| !value.is_empty())
        else {
            return Ok(BTreeMap::new());
        };

        let parsed: Value = serde_json::from_str(text).map_err(|error| {
            AppError::Validation(format!("inputs are not valid JSON: {error}"))
        })?;

        let Value::Object(fields) = parsed else {
            return Err(AppError::Validation(
                "inputs must be a JSON object".to_owned(),
            ));
        };

        Ok(self.conversion_service.convert_parameters(&fields))
    }
}

/// Writes the caller's contact into the configured parameters.
///
/// Injected values replace same-named input fields. Anonymous callers inject
/// nothing.
pub(super) fn inject_caller_parameters(
    parameters: &mut BTreeMap<String, TypedValue>,
    configuration: &ActionConfiguration,
    caller: &CallerContext,
) {
    if let (Some(parameter), Some(contact_id)) =
        (configuration.contact_id_parameter(), caller.contact_id())
    {
        parameters.insert(parameter.to_owned(), TypedValue::Guid(contact_id.as_uuid()));
    }

    if let (Some(parameter), Some(reference)) = (
        configuration.contact_reference_parameter(),
        caller.contact_reference(),
    ) {
        parameters.insert(parameter.to_owned(), TypedValue::EntityReference(reference));
    }
}
