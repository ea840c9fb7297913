use super::*;

impl ValueConversionService {
    /// Infers a typed value from the JSON shape alone.
    pub(super) fn infer(&self, raw: &Value) -> TypedValue {
        match raw {
            Value::Object(object) => self.infer_object(object),
            Value::Array(items) => TypedValue::TextArray(items.iter().map(text_form).collect()),
            Value::Number(number) => {
                if let Some(integer) = number.as_i64() {
                    // Out-of-range integers truncate to 32 bits.
                    TypedValue::Int32(integer as i32)
                } else if let Some(integer) = number.as_u64() {
                    TypedValue::Int32(integer as i32)
                } else {
                    number
                        .as_f64()
                        .map_or_else(|| TypedValue::Raw(raw.clone()), TypedValue::Float64)
                }
            }
            Value::String(content) => infer_string(content),
            Value::Bool(value) => TypedValue::Bool(*value),
            Value::Null => TypedValue::Raw(Value::Null),
        }
    }

    fn infer_object(&self, object: &Map<String, Value>) -> TypedValue {
        if object.contains_key(ATTRIBUTES_KEY) {
            return TypedValue::Entity(self.decode_entity(object));
        }

        if let (Some(logical_name), Some(id)) = (
            non_empty_str(object.get(LOGICAL_NAME_KEY)),
            object.get(ID_KEY).and_then(guid_value),
        ) {
            return TypedValue::EntityReference(EntityReference::new(logical_name, id));
        }

        if let Some(entity_name) = object.get(ENTITY_NAME_KEY).filter(|value| !value.is_null()) {
            return TypedValue::EntityCollection(
                self.decode_collection(text_form(entity_name), object),
            );
        }

        if let Some(amount) = object.get(MONEY_KEY).and_then(decimal_value) {
            return TypedValue::Money(amount);
        }

        if let Some(option) = object.get(OPTION_SET_VALUE_KEY).and_then(int_value) {
            return TypedValue::OptionSet(option);
        }

        TypedValue::Raw(Value::Object(object.clone()))
    }

    fn decode_entity(&self, object: &Map<String, Value>) -> Entity {
        let logical_name = non_empty_str(object.get(LOGICAL_NAME_KEY)).unwrap_or_default();

        let id = match object.get(ID_KEY).filter(|value| !value.is_null()) {
            Some(raw_id) => {
                let id = guid_value(raw_id);
                if id.is_none() {
                    warn!(
                        logical_name = logical_name,
                        id = %raw_id,
                        "conversion recovered: entity id is not a guid, dropping it"
                    );
                }
                id
            }
            None => None,
        };

        let mut entity = Entity::new(logical_name, id);
        match object.get(ATTRIBUTES_KEY) {
            Some(Value::Object(attributes)) => {
                debug!(
                    logical_name = logical_name,
                    attribute_count = attributes.len(),
                    "decoding entity attributes"
                );
                entity.attributes = self.convert_parameters(attributes);
            }
            Some(Value::Null) | None => {}
            Some(other) => {
                warn!(
                    logical_name = logical_name,
                    attributes = %other,
                    "conversion recovered: entity attributes are not an object, ignoring them"
                );
            }
        }

        entity
    }

    fn decode_collection(
        &self,
        entity_name: String,
        object: &Map<String, Value>,
    ) -> EntityCollection {
        let entities = match object.get(ENTITIES_KEY) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::Object(entity) => Some(self.decode_entity(entity)),
                    other => {
                        warn!(
                            entity_name = %entity_name,
                            item = %other,
                            "conversion recovered: skipping non-object collection member"
                        );
                        None
                    }
                })
                .collect(),
            _ => Vec::new(),
        };

        EntityCollection {
            entity_name,
            entities,
        }
    }
}

fn infer_string(content: &str) -> TypedValue {
    if content.ends_with(['m', 'M'])
        && let Some(value) = parse_decimal(content.trim_end_matches(['m', 'M']))
    {
        return TypedValue::Decimal(value);
    }

    if let Ok(value) = Uuid::parse_str(content) {
        return TypedValue::Guid(value);
    }

    if let Ok(value) = DateTime::parse_from_rfc3339(content) {
        return TypedValue::DateTime(value.with_timezone(&Utc));
    }

    TypedValue::Text(content.to_owned())
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|content| !content.is_empty())
}

fn guid_value(value: &Value) -> Option<Uuid> {
    value
        .as_str()
        .and_then(|content| Uuid::parse_str(content.trim()).ok())
}

fn decimal_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => parse_decimal(&number.to_string()),
        Value::String(content) => parse_decimal(content),
        _ => None,
    }
}

fn int_value(value: &Value) -> Option<i32> {
    match value {
        Value::Number(number) => number.as_i64().and_then(|integer| i32::try_from(integer).ok()),
        Value::String(content) => content.trim().parse().ok(),
        _ => None,
    }
}
