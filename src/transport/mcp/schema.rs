//! Translate raw MCP tool definitions into the normalized schema
//!
//! A raw definition looks like:
//!
//! ```json
//! {
//!   "name": "search_hotels",
//!   "description": "Search hotels by city",
//!   "inputSchema": {
//!     "type": "object",
//!     "properties": {"city": {"type": "string", "description": "City"}},
//!     "required": ["city"]
//!   },
//!   "_meta": {
//!     "toolbox/authParam": {"user_id": ["google"]},
//!     "toolbox/authInvoke": ["my-service"]
//!   }
//! }
//! ```
//!
//! Parameters keep the order of `inputSchema.properties`. Nested `items` and
//! `additionalProperties` schemas translate recursively with an empty name
//! and `required = false`.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

use super::types::{META_AUTH_INVOKE, META_AUTH_PARAM};
use crate::error::ToolboxError;
use crate::types::{AdditionalProperties, ParameterSchema, ToolSchema};

/// Translate every definition of a `tools/list` result, keyed by name.
///
/// # Errors
///
/// Returns [`ToolboxError::MalformedDefinition`] naming the index of the
/// first definition that is not an object, has no non-empty `name`, repeats
/// an earlier name, or has a malformed property. The whole listing fails; nothing is skipped.
pub fn convert_tool_list(
    definitions: &[Value],
) -> std::result::Result<HashMap<String, ToolSchema>, ToolboxError> {
    let mut tools = HashMap::with_capacity(definitions.len());
    for (index, raw) in definitions.iter().enumerate() {
        let malformed = |reason: String| ToolboxError::MalformedDefinition { index, reason };

        let definition = raw
            .as_object()
            .ok_or_else(|| malformed("definition is not an object".to_string()))?;

        let name = match definition.get("name").and_then(Value::as_str) {
            Some(name) if !name.is_empty() => name,
            _ => return Err(malformed("missing 'name' field".to_string())),
        };

        if tools.contains_key(name) {
            return Err(malformed(format!("duplicate name '{}'", name)));
        }

        let schema = convert_tool_definition(definition).map_err(malformed)?;
        tools.insert(name.to_string(), schema);
    }
    Ok(tools)
}

/// Translate one raw definition object.
///
/// # Errors
///
/// Returns a description of the first malformed property.
pub fn convert_tool_definition(
    definition: &Map<String, Value>,
) -> std::result::Result<ToolSchema, String> {
    let meta = definition.get("_meta").and_then(Value::as_object);
    let param_auth = meta
        .and_then(|m| m.get(META_AUTH_PARAM))
        .and_then(Value::as_object);
    let auth_required = meta
        .and_then(|m| m.get(META_AUTH_INVOKE))
        .map(string_list)
        .unwrap_or_default();

    let input_schema = definition.get("inputSchema").and_then(Value::as_object);
    let required: HashSet<&str> = input_schema
        .and_then(|s| s.get("required"))
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let mut parameters = Vec::new();
    if let Some(properties) = input_schema
        .and_then(|s| s.get("properties"))
        .and_then(Value::as_object)
    {
        for (name, property) in properties {
            let property = property
                .as_object()
                .ok_or_else(|| format!("property '{}' is not an object", name))?;
            let mut param = convert_property(name, property, required.contains(name.as_str()));
            if let Some(sources) = param_auth.and_then(|a| a.get(name)) {
                param.auth_sources = string_list(sources);
            }
            parameters.push(param);
        }
    }

    Ok(ToolSchema {
        description: str_field(definition, "description"),
        parameters,
        auth_required,
    })
}

/// Translate one property schema, recursing into `items` for arrays and
/// `additionalProperties` for objects.
pub fn convert_property(name: &str, property: &Map<String, Value>, required: bool) -> ParameterSchema {
    let param_type = str_field(property, "type");

    let items = if param_type == "array" {
        property
            .get("items")
            .and_then(Value::as_object)
            .map(|nested| Box::new(convert_property("", nested, false)))
    } else {
        None
    };

    let additional_properties = if param_type == "object" {
        match property.get("additionalProperties") {
            Some(Value::Bool(allowed)) => Some(AdditionalProperties::Allowed(*allowed)),
            Some(Value::Object(nested)) => Some(AdditionalProperties::Schema(Box::new(
                convert_property("", nested, false),
            ))),
            _ => None,
        }
    } else {
        None
    };

    ParameterSchema {
        name: name.to_string(),
        param_type,
        required,
        description: str_field(property, "description"),
        auth_sources: Vec::new(),
        items,
        additional_properties,
    }
}

fn str_field(object: &Map<String, Value>, key: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
