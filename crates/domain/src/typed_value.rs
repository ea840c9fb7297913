use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Map, Number, Value};
use uuid::Uuid;

/// Discriminator key marking an entity object.
pub const ATTRIBUTES_KEY: &str = "Attributes";
/// Entity or reference logical name key.
pub const LOGICAL_NAME_KEY: &str = "LogicalName";
/// Entity or reference identifier key.
pub const ID_KEY: &str = "Id";
/// Discriminator key marking an entity collection object.
pub const ENTITY_NAME_KEY: &str = "EntityName";
/// Entity collection items key.
pub const ENTITIES_KEY: &str = "Entities";
/// Discriminator key marking a money object.
pub const MONEY_KEY: &str = "Money";
/// Discriminator key marking an option set object.
pub const OPTION_SET_VALUE_KEY: &str = "OptionSetValue";

/// Reference to one platform record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityReference {
    /// Entity logical name, e.g. `contact`.
    pub logical_name: String,
    /// Record identifier.
    pub id: Uuid,
}

impl EntityReference {
    /// Creates a record reference.
    #[must_use]
    pub fn new(logical_name: impl Into<String>, id: Uuid) -> Self {
        Self {
            logical_name: logical_name.into(),
            id,
        }
    }
}

/// Platform record with typed attributes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entity {
    /// Entity logical name. Empty when the payload carried none.
    pub logical_name: String,
    /// Optional record identifier.
    pub id: Option<Uuid>,
    /// Attribute values keyed by attribute logical name.
    pub attributes: BTreeMap<String, TypedValue>,
}

impl Entity {
    /// Creates an entity without attributes.
    #[must_use]
    pub fn new(logical_name: impl Into<String>, id: Option<Uuid>) -> Self {
        Self {
            logical_name: logical_name.into(),
            id,
            attributes: BTreeMap::new(),
        }
    }
}

/// Named sequence of entities.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityCollection {
    /// Logical name shared by the collection.
    pub entity_name: String,
    /// Collection members.
    pub entities: Vec<Entity>,
}

/// Closed set of typed values passed to custom APIs.
///
/// Entities and collections own their children, so every value is a finite
/// tree.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    /// Plain text.
    Text(String),
    /// 32-bit whole number.
    Int32(i32),
    /// Base-10 decimal.
    Decimal(Decimal),
    /// Two-state value.
    Bool(bool),
    /// Unique identifier.
    Guid(Uuid),
    /// Double precision float.
    Float64(f64),
    /// UTC timestamp.
    DateTime(DateTime<Utc>),
    /// Choice value.
    OptionSet(i32),
    /// Currency amount.
    Money(Decimal),
    /// Record reference.
    EntityReference(EntityReference),
    /// Record with attributes.
    Entity(Entity),
    /// Named record collection.
    EntityCollection(EntityCollection),
    /// Sequence of strings.
    TextArray(Vec<String>),
    /// Untyped JSON passed through unchanged.
    Raw(Value),
}

impl TypedValue {
    /// Returns stable variant name used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Int32(_) => "int32",
            Self::Decimal(_) => "decimal",
            Self::Bool(_) => "bool",
            Self::Guid(_) => "guid",
            Self::Float64(_) => "float64",
            Self::DateTime(_) => "datetime",
            Self::OptionSet(_) => "option_set",
            Self::Money(_) => "money",
            Self::EntityReference(_) => "entity_reference",
            Self::Entity(_) => "entity",
            Self::EntityCollection(_) => "entity_collection",
            Self::TextArray(_) => "text_array",
            Self::Raw(_) => "raw",
        }
    }

    /// Encodes the value into the JSON shape accepted as action input.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(value) => Value::String(value.clone()),
            Self::Int32(value) => Value::Number((*value).into()),
            Self::Decimal(value) => decimal_to_json(*value),
            Self::Bool(value) => Value::Bool(*value),
            Self::Guid(value) => Value::String(value.to_string()),
            Self::Float64(value) => Number::from_f64(*value).map_or(Value::Null, Value::Number),
            Self::DateTime(value) => {
                Value::String(value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Self::OptionSet(value) => single_key_object(OPTION_SET_VALUE_KEY, (*value).into()),
            Self::Money(value) => single_key_object(MONEY_KEY, decimal_to_json(*value)),
            Self::EntityReference(reference) => {
                let mut object = Map::with_capacity(2);
                object.insert(
                    LOGICAL_NAME_KEY.to_owned(),
                    Value::String(reference.logical_name.clone()),
                );
                object.insert(ID_KEY.to_owned(), Value::String(reference.id.to_string()));
                Value::Object(object)
            }
            Self::Entity(entity) => entity_to_json(entity),
            Self::EntityCollection(collection) => {
                let mut object = Map::with_capacity(2);
                object.insert(
                    ENTITY_NAME_KEY.to_owned(),
                    Value::String(collection.entity_name.clone()),
                );
                object.insert(
                    ENTITIES_KEY.to_owned(),
                    Value::Array(collection.entities.iter().map(entity_to_json).collect()),
                );
                Value::Object(object)
            }
            Self::TextArray(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            Self::Raw(value) => value.clone(),
        }
    }
}

fn entity_to_json(entity: &Entity) -> Value {
    let attributes = entity
        .attributes
        .iter()
        .map(|(name, value)| (name.clone(), value.to_json()))
        .collect::<Map<String, Value>>();

    let mut object = Map::with_capacity(3);
    object.insert(
        LOGICAL_NAME_KEY.to_owned(),
        Value::String(entity.logical_name.clone()),
    );
    if let Some(id) = entity.id {
        object.insert(ID_KEY.to_owned(), Value::String(id.to_string()));
    }
    object.insert(ATTRIBUTES_KEY.to_owned(), Value::Object(attributes));
    Value::Object(object)
}

fn single_key_object(key: &str, value: Value) -> Value {
    let mut object = Map::with_capacity(1);
    object.insert(key.to_owned(), value);
    Value::Object(object)
}

fn decimal_to_json(value: Decimal) -> Value {
    value
        .to_f64()
        .and_then(Number::from_f64)
        .map_or_else(|| Value::String(value.to_string()), Value::Number)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use serde_json::json;
    use uuid::Uuid;

    use super::{Entity, EntityCollection, EntityReference, TypedValue};

    fn contact_id() -> Uuid {
        Uuid::parse_str("4121902e-0530-ef11-8409-6045bd9e7366").unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn money_and_option_set_encode_as_discriminated_objects() {
        let money = Decimal::from_str("7.8").unwrap_or_else(|_| unreachable!());

        assert_eq!(TypedValue::Money(money).to_json(), json!({"Money": 7.8}));
        assert_eq!(
            TypedValue::OptionSet(1).to_json(),
            json!({"OptionSetValue": 1})
        );
    }

    #[test]
    fn entity_collection_encodes_nested_attributes() {
        let mut entity = Entity::new("contact", Some(contact_id()));
        entity
            .attributes
            .insert("firstname".to_owned(), TypedValue::Text("Ada".to_owned()));
        entity.attributes.insert(
            "parentcustomerid".to_owned(),
            TypedValue::EntityReference(EntityReference::new("account", contact_id())),
        );

        let collection = TypedValue::EntityCollection(EntityCollection {
            entity_name: "contact".to_owned(),
            entities: vec![entity],
        });

        assert_eq!(
            collection.to_json(),
            json!({
                "EntityName": "contact",
                "Entities": [{
                    "LogicalName": "contact",
                    "Id": "4121902e-0530-ef11-8409-6045bd9e7366",
                    "Attributes": {
                        "firstname": "Ada",
                        "parentcustomerid": {
                            "LogicalName": "account",
                            "Id": "4121902e-0530-ef11-8409-6045bd9e7366"
                        }
                    }
                }]
            })
        );
    }

    #[test]
    fn entity_without_id_omits_id_key() {
        let entity = TypedValue::Entity(Entity::new("task", None));
        assert_eq!(
            entity.to_json(),
            json!({"LogicalName": "task", "Attributes": {}})
        );
    }

    #[test]
    fn non_finite_float_encodes_as_null() {
        assert_eq!(TypedValue::Float64(f64::NAN).to_json(), json!(null));
    }
}
