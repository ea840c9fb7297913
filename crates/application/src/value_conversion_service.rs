use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use porta_domain::{
    ATTRIBUTES_KEY, AttributeHint, ENTITIES_KEY, ENTITY_NAME_KEY, Entity, EntityCollection,
    EntityReference, HintedAttribute, ID_KEY, LOGICAL_NAME_KEY, MONEY_KEY, OPTION_SET_VALUE_KEY,
    TypedValue,
};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

mod hinted;
mod inference;


/// Converts JSON input values into typed platform values.
///
/// Conversion never fails: a hint that cannot be honored falls back to
/// inference, and unrecognised shapes pass through as [`TypedValue::Raw`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueConversionService;

impl ValueConversionService {
    /// Creates the conversion service.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Converts one raw value, honoring the attribute name's hint suffix.
    #[must_use]
    pub fn convert(&self, attribute_name: &str, raw: &Value) -> TypedValue {
        let hinted = HintedAttribute::split(attribute_name);

        let converted = match hinted.hint {
            None => self.infer(raw),
            Some(hint_text) => match AttributeHint::parse(hint_text) {
                Some(hint) => match hinted::convert_hinted(hint, raw) {
                    Ok(value) => value,
                    Err(reason) => {
                        warn!(
                            attribute = attribute_name,
                            hint = hint.as_str(),
                            reason = %reason,
                            "conversion recovered: hinted value did not parse, inferring type"
                        );
                        self.infer(raw)
                    }
                },
                None => {
                    warn!(
                        attribute = attribute_name,
                        hint = hint_text,
                        "conversion recovered: unrecognized hint, inferring type"
                    );
                    self.infer(raw)
                }
            },
        };

        debug!(
            attribute = attribute_name,
            value_type = converted.type_name(),
            "converted input value"
        );
        converted
    }

    /// Converts every field of a JSON object into named parameters.
    ///
    /// Hint suffixes are stripped from the returned parameter names. When two
    /// fields strip to the same name, the later field in key order wins.
    #[must_use]
    pub fn convert_parameters(&self, fields: &Map<String, Value>) -> BTreeMap<String, TypedValue> {
        let mut parameters = BTreeMap::new();

        for (attribute_name, raw) in fields {
            let name = HintedAttribute::split(attribute_name).name;
            if parameters
                .insert(name.to_owned(), self.convert(attribute_name, raw))
                .is_some()
            {
                warn!(
                    attribute = attribute_name.as_str(),
                    parameter = name,
                    "input field replaces an earlier field with the same parameter name"
                );
            }
        }

        parameters
    }
}

/// Renders a JSON value the way a hint parser sees it.
fn text_form(raw: &Value) -> String {
    match raw {
        Value::Null => String::new(),
        Value::String(content) => content.clone(),
        other => other.to_string(),
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();

    if let Ok(value) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(value.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(value) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(value.and_utc());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|value| value.and_utc())
}
