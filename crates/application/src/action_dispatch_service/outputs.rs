use super::*;

/// Serializes custom API outputs as indented JSON text.
pub(super) fn encode_outputs(outputs: &BTreeMap<String, TypedValue>) -> AppResult<String> {
    let object = outputs
        .iter()
        .map(|(name, value)| (name.clone(), value.to_json()))
        .collect::<Map<String, Value>>();

    serde_json::to_string_pretty(&Value::Object(object))
        .map_err(|error| AppError::Internal(format!("failed to encode action outputs: {error}")))
}
