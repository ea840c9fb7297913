use porta_core::{AppResult, ContactId};
use serde_json::Value;

mod odata;

/// Trigger attribute naming the operation to run.
pub const OPERATION_ATTRIBUTE: &str = "operation";
/// Trigger attribute carrying the raw JSON input text.
pub const INPUTS_ATTRIBUTE: &str = "inputs";
/// Trigger attribute carrying the caller's contact id.
pub const CONTACT_ID_ATTRIBUTE: &str = "contact_id";

/// Comparison operator of one filter condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionOperator {
    /// Equal to.
    Eq,
    /// Not equal to.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal to.
    Ge,
    /// Less than.
    Lt,
    /// Less than or equal to.
    Le,
}

impl ConditionOperator {
    /// Parses an OData comparison keyword.
    #[must_use]
    pub fn parse_transport(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "eq" => Some(Self::Eq),
            "ne" => Some(Self::Ne),
            "gt" => Some(Self::Gt),
            "ge" => Some(Self::Ge),
            "lt" => Some(Self::Lt),
            "le" => Some(Self::Le),
            _ => None,
        }
    }
}

/// One attribute comparison inside a trigger filter.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerCondition {
    /// Compared attribute name.
    pub attribute: String,
    /// Comparison operator.
    pub operator: ConditionOperator,
    /// Compared values.
    pub values: Vec<Value>,
}

/// Query-shaped trigger: conditions plus nested filter groups.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TriggerFilter {
    /// Conditions at this level.
    pub conditions: Vec<TriggerCondition>,
    /// Nested filter groups.
    pub filters: Vec<TriggerFilter>,
}

impl TriggerFilter {
    /// Adds one equality condition.
    #[must_use]
    pub fn with_condition(mut self, attribute: impl Into<String>, value: Value) -> Self {
        self.conditions.push(TriggerCondition {
            attribute: attribute.into(),
            operator: ConditionOperator::Eq,
            values: vec![value],
        });
        self
    }

    /// Adds one nested filter group.
    #[must_use]
    pub fn with_filter(mut self, filter: TriggerFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Parses an OData `$filter` expression.
    pub fn parse_odata(text: &str) -> AppResult<Self> {
        odata::parse(text)
    }

    /// Returns the first value of the first condition on `attribute`.
    ///
    /// Conditions at one level are searched before nested groups.
    #[must_use]
    pub fn first_value(&self, attribute: &str) -> Option<&Value> {
        self.conditions
            .iter()
            .find(|condition| condition.attribute == attribute)
            .and_then(|condition| condition.values.first())
            .or_else(|| {
                self.filters
                    .iter()
                    .find_map(|filter| filter.first_value(attribute))
            })
    }
}

/// Operation request decoded from a trigger.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionTrigger {
    operation: Option<String>,
    inputs: Option<String>,
    contact_id: Option<ContactId>,
}

impl ActionTrigger {
    /// Creates an anonymous trigger.
    #[must_use]
    pub fn new(operation: Option<String>, inputs: Option<String>) -> Self {
        Self {
            operation: operation.filter(|value| !value.trim().is_empty()),
            inputs,
            contact_id: None,
        }
    }

    /// Extracts trigger fields from a query filter.
    ///
    /// A contact id that is not a GUID is ignored.
    #[must_use]
    pub fn from_filter(filter: &TriggerFilter) -> Self {
        let contact_id = filter
            .first_value(CONTACT_ID_ATTRIBUTE)
            .and_then(value_text)
            .and_then(|value| ContactId::parse_optional(value.as_str()).ok().flatten());

        Self::new(
            filter.first_value(OPERATION_ATTRIBUTE).and_then(value_text),
            filter.first_value(INPUTS_ATTRIBUTE).and_then(value_text),
        )
        .with_contact_id(contact_id)
    }

    /// Replaces the caller's contact id.
    #[must_use]
    pub fn with_contact_id(mut self, contact_id: Option<ContactId>) -> Self {
        self.contact_id = contact_id;
        self
    }

    /// Returns requested operation.
    #[must_use]
    pub fn operation(&self) -> Option<&str> {
        self.operation.as_deref()
    }

    /// Returns raw input text.
    #[must_use]
    pub fn inputs(&self) -> Option<&str> {
        self.inputs.as_deref()
    }

    /// Returns caller contact id.
    #[must_use]
    pub fn contact_id(&self) -> Option<ContactId> {
        self.contact_id
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(content) => Some(content.clone()),
        other => Some(other.to_string()),
    }
}
