/// Delimiter between an attribute name and its parsing hint.
///
/// Platform attribute names cannot contain `@`.
pub const HINT_DELIMITER: char = '@';

/// Parsing hint appended to an input attribute name, e.g. `amount@money`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeHint {
    /// Keep the value as text.
    String,
    /// 32-bit whole number.
    Int,
    /// Base-10 decimal.
    Decimal,
    /// Two-state value.
    Bool,
    /// Unique identifier.
    Guid,
    /// Double precision float.
    Float,
    /// UTC timestamp.
    DateTime,
    /// Choice value.
    Picklist,
    /// Currency amount.
    Money,
}

impl AttributeHint {
    /// Returns the transport value for this hint.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Decimal => "decimal",
            Self::Bool => "bool",
            Self::Guid => "guid",
            Self::Float => "float",
            Self::DateTime => "datetime",
            Self::Picklist => "picklist",
            Self::Money => "money",
        }
    }

    /// Parses a hint case-insensitively. Unknown hints yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "string" => Some(Self::String),
            "int" => Some(Self::Int),
            "decimal" => Some(Self::Decimal),
            "bool" => Some(Self::Bool),
            "guid" => Some(Self::Guid),
            "float" => Some(Self::Float),
            "datetime" => Some(Self::DateTime),
            "picklist" => Some(Self::Picklist),
            "money" => Some(Self::Money),
            _ => None,
        }
    }
}

/// Attribute name split into the platform name and the raw hint text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HintedAttribute<'a> {
    /// Attribute name without the hint suffix.
    pub name: &'a str,
    /// Raw text after the last delimiter, if any.
    pub hint: Option<&'a str>,
}

impl<'a> HintedAttribute<'a> {
    /// Splits an attribute name at the last hint delimiter.
    #[must_use]
    pub fn split(attribute_name: &'a str) -> Self {
        match attribute_name.rsplit_once(HINT_DELIMITER) {
            Some((name, hint)) => Self {
                name,
                hint: Some(hint),
            },
            None => Self {
                name: attribute_name,
                hint: None,
            },
        }
    }

    /// Returns the recognised hint, if any.
    #[must_use]
    pub fn recognized_hint(&self) -> Option<AttributeHint> {
        self.hint.and_then(AttributeHint::parse)
    }
}

#[cfg(test)]
mod tests {
    use super::{AttributeHint, HintedAttribute};

    #[test]
    fn split_uses_last_delimiter() {
        let hinted = HintedAttribute::split("mail@home@string");
        assert_eq!(hinted.name, "mail@home");
        assert_eq!(hinted.recognized_hint(), Some(AttributeHint::String));
    }

    #[test]
    fn plain_attribute_has_no_hint() {
        let hinted = HintedAttribute::split("firstname");
        assert_eq!(hinted.name, "firstname");
        assert_eq!(hinted.hint, None);
    }

    #[test]
    fn hints_are_case_insensitive() {
        assert_eq!(AttributeHint::parse("PickList"), Some(AttributeHint::Picklist));
        assert_eq!(AttributeHint::parse("currency"), None);
    }
}
