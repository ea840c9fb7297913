//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod action;
mod attribute_hint;
mod trigger;
mod typed_value;

pub use action::{
    ActionConfiguration, ActionConfigurationInput, ActionInvocation, ActionType,
    CONTACT_LOGICAL_NAME, CallerContext, InvocationStatus,
};
pub use attribute_hint::{AttributeHint, HINT_DELIMITER, HintedAttribute};
pub use trigger::{
    ActionTrigger, CONTACT_ID_ATTRIBUTE, ConditionOperator, INPUTS_ATTRIBUTE,
    OPERATION_ATTRIBUTE, TriggerCondition, TriggerFilter,
};
pub use typed_value::{
    ATTRIBUTES_KEY, ENTITIES_KEY, ENTITY_NAME_KEY, Entity, EntityCollection, EntityReference,
    ID_KEY, LOGICAL_NAME_KEY, MONEY_KEY, OPTION_SET_VALUE_KEY, TypedValue,
};
