use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use porta_core::{AppError, AppResult};
use porta_domain::{EntityReference, TypedValue};
use porta_infrastructure::{CustomApiHandler, InProcessCustomApiExecutor};
use tracing::debug;
use uuid::Uuid;

/// Full names of the contacts the sample APIs can look up.
pub type ContactDirectory = HashMap<Uuid, String>;

pub const GREETER: &str = "porta_Greeter";
pub const GREETER_BOUND: &str = "porta_GreeterBound";
pub const PARAM_RETURNER: &str = "porta_ParamReturner";

/// Builds the in-process registry with every sample custom API.
pub fn build_sample_executor(contacts: ContactDirectory) -> InProcessCustomApiExecutor {
    let contacts = Arc::new(contacts);

    InProcessCustomApiExecutor::new()
        .with_handler(
            GREETER,
            Arc::new(GreeterApi {
                contacts: contacts.clone(),
            }),
        )
        .with_handler(GREETER_BOUND, Arc::new(GreeterBoundApi { contacts }))
        .with_handler(PARAM_RETURNER, Arc::new(ParamReturnerApi))
}

/// Fills `{FullName}` and `{Id}` placeholders in `Text`.
struct GreeterApi {
    contacts: Arc<ContactDirectory>,
}

#[async_trait]
impl CustomApiHandler for GreeterApi {
    async fn handle(
        &self,
        parameters: &BTreeMap<String, TypedValue>,
    ) -> AppResult<BTreeMap<String, TypedValue>> {
        let text = match parameters.get("Text") {
            Some(TypedValue::Text(text)) => text.clone(),
            None => String::new(),
            Some(other) => {
                return Err(AppError::Validation(format!(
                    "Text must be text, got {}",
                    other.type_name()
                )));
            }
        };

        let full_name = match parameters.get("ContactReference") {
            Some(TypedValue::EntityReference(reference)) => {
                full_name(&self.contacts, reference)?
            }
            _ => "Anonymous".to_owned(),
        };
        let id = match parameters.get("ContactId") {
            Some(TypedValue::Guid(id)) => id.to_string(),
            _ => "not present".to_owned(),
        };

        let greeting = text.replace("{FullName}", &full_name).replace("{Id}", &id);
        Ok(BTreeMap::from([(
            "Text".to_owned(),
            TypedValue::Text(greeting),
        )]))
    }
}

/// Greets the contact bound as `Target`.
struct GreeterBoundApi {
    contacts: Arc<ContactDirectory>,
}

#[async_trait]
impl CustomApiHandler for GreeterBoundApi {
    async fn handle(
        &self,
        parameters: &BTreeMap<String, TypedValue>,
    ) -> AppResult<BTreeMap<String, TypedValue>> {
        let text = match parameters.get("Target") {
            Some(TypedValue::EntityReference(reference)) => {
                format!("You are {}", full_name(&self.contacts, reference)?)
            }
            _ => "You are nobody".to_owned(),
        };

        Ok(BTreeMap::from([("Text".to_owned(), TypedValue::Text(text))]))
    }
}

/// Echoes every input parameter as an output.
struct ParamReturnerApi;

#[async_trait]
impl CustomApiHandler for ParamReturnerApi {
    async fn handle(
        &self,
        parameters: &BTreeMap<String, TypedValue>,
    ) -> AppResult<BTreeMap<String, TypedValue>> {
        for (name, value) in parameters {
            debug!(
                parameter = name.as_str(),
                value = %describe(value),
                "returning input parameter"
            );
        }

        Ok(parameters.clone())
    }
}

fn full_name(contacts: &ContactDirectory, reference: &EntityReference) -> AppResult<String> {
    contacts.get(&reference.id).cloned().ok_or_else(|| {
        AppError::NotFound(format!(
            "{} '{}' does not exist",
            reference.logical_name, reference.id
        ))
    })
}

fn describe(value: &TypedValue) -> String {
    match value {
        TypedValue::Text(text) => text.clone(),
        TypedValue::TextArray(items) => items.join(";"),
        TypedValue::EntityReference(reference) => {
            format!("{}({})", reference.id, reference.logical_name)
        }
        TypedValue::Entity(entity) => format!(
            "{}({}, {} attributes)",
            entity.id.map(|id| id.to_string()).unwrap_or_default(),
            entity.logical_name,
            entity.attributes.len()
        ),
        TypedValue::EntityCollection(collection) => format!(
            "{} ({} entities)",
            collection.entity_name,
            collection.entities.len()
        ),
        other => other.to_json().to_string(),
    }
}
