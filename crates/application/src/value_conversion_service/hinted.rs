use super::*;

/// Parses a raw value according to an explicit hint.
pub(super) fn convert_hinted(hint: AttributeHint, raw: &Value) -> Result<TypedValue, String> {
    let text = text_form(raw);
    let trimmed = text.trim();

    match hint {
        AttributeHint::String => Ok(TypedValue::Text(text)),
        AttributeHint::Int => parse_int(trimmed).map(TypedValue::Int32),
        AttributeHint::Decimal => parse_decimal(trimmed)
            .map(TypedValue::Decimal)
            .ok_or_else(|| format!("'{trimmed}' is not a decimal")),
        AttributeHint::Bool => parse_bool(trimmed).map(TypedValue::Bool),
        AttributeHint::Guid => Uuid::parse_str(trimmed)
            .map(TypedValue::Guid)
            .map_err(|error| format!("'{trimmed}' is not a guid: {error}")),
        AttributeHint::Float => trimmed
            .parse::<f64>()
            .map(TypedValue::Float64)
            .map_err(|error| format!("'{trimmed}' is not a float: {error}")),
        AttributeHint::DateTime => parse_datetime(trimmed)
            .map(TypedValue::DateTime)
            .ok_or_else(|| format!("'{trimmed}' is not a date time")),
        AttributeHint::Picklist => parse_int(trimmed).map(TypedValue::OptionSet),
        AttributeHint::Money => parse_decimal(trimmed)
            .map(TypedValue::Money)
            .ok_or_else(|| format!("'{trimmed}' is not a money amount")),
    }
}

fn parse_int(text: &str) -> Result<i32, String> {
    text.parse::<i32>()
        .map_err(|error| format!("'{text}' is not a 32-bit integer: {error}"))
}

fn parse_bool(text: &str) -> Result<bool, String> {
    if text.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if text.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(format!("'{text}' is not a boolean"))
    }
}
