//! Normalized tool data model
//!
//! Every transport, whatever its wire protocol, produces these types.
//! They also match the JSON shape of the REST manifest endpoints, so the
//! REST transport deserializes them directly.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Normalized schema of one tool parameter.
///
/// `items` is populated only for `array` parameters and
/// `additional_properties` only for `object` parameters.
///
/// # Examples
///
/// ```
/// use toolbox_transport::types::ParameterSchema;
///
/// let param = ParameterSchema {
///     name: "city".to_string(),
///     param_type: "string".to_string(),
///     required: true,
///     description: "City to look up".to_string(),
///     ..Default::default()
/// };
/// let json = serde_json::to_value(&param).unwrap();
/// assert_eq!(json["type"], "string");
/// assert!(json.get("items").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSchema {
    /// Parameter name; empty for nested `items` / `additionalProperties`
    /// schemas.
    #[serde(default)]
    pub name: String,
    /// JSON type name (`string`, `integer`, `number`, `boolean`, `array`,
    /// `object`).
    #[serde(rename = "type", default)]
    pub param_type: String,
    /// Whether the caller must supply this parameter.
    #[serde(default)]
    pub required: bool,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Auth services whose tokens can populate this parameter.
    #[serde(default)]
    pub auth_sources: Vec<String>,
    /// Element schema for `array` parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ParameterSchema>>,
    /// Value policy for `object` parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,
}

/// The `additionalProperties` value of an `object` parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    /// `true` allows any value, `false` allows none.
    Allowed(bool),
    /// Every value must match this schema.
    Schema(Box<ParameterSchema>),
}

/// Normalized description of one tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSchema {
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Parameters in declaration order.
    #[serde(default)]
    pub parameters: Vec<ParameterSchema>,
    /// Auth services required to invoke the tool at all.
    #[serde(default)]
    pub auth_required: Vec<String>,
}

/// The set of tools a server returned for a listing or lookup.
///
/// # Examples
///
/// ```
/// use toolbox_transport::types::ManifestSchema;
///
/// let manifest: ManifestSchema = serde_json::from_str(
///     r#"{"serverVersion":"0.9.0","tools":{"echo":{"description":"Echo"}}}"#,
/// ).unwrap();
/// assert_eq!(manifest.server_version, "0.9.0");
/// assert!(manifest.tools.contains_key("echo"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestSchema {
    /// Implementation version reported by the server.
    #[serde(default)]
    pub server_version: String,
    /// Tools keyed by unique name.
    #[serde(default)]
    pub tools: HashMap<String, ToolSchema>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_additional_properties_bool_or_schema() {
        let allowed: AdditionalProperties = serde_json::from_str("true").unwrap();
        assert_eq!(allowed, AdditionalProperties::Allowed(true));

        let nested: AdditionalProperties =
            serde_json::from_str(r#"{"name":"","type":"integer"}"#).unwrap();
        match nested {
            AdditionalProperties::Schema(schema) => assert_eq!(schema.param_type, "integer"),
            other => panic!("expected nested schema, got {other:?}"),
        }
    }

    #[test]
    fn test_rest_manifest_shape() {
        let json = serde_json::json!({
            "serverVersion": "1.2.3",
            "tools": {
                "search_hotels": {
                    "description": "Search hotels",
                    "parameters": [
                        {
                            "name": "location",
                            "type": "string",
                            "required": true,
                            "description": "City",
                            "authSources": []
                        },
                        {
                            "name": "tags",
                            "type": "array",
                            "description": "Tags",
                            "authSources": ["google"],
                            "items": {"name": "", "type": "string", "description": "", "authSources": []}
                        }
                    ],
                    "authRequired": ["my-service"]
                }
            }
        });

        let manifest: ManifestSchema = serde_json::from_value(json).unwrap();
        let tool = &manifest.tools["search_hotels"];
        assert_eq!(tool.auth_required, vec!["my-service".to_string()]);
        assert_eq!(tool.parameters.len(), 2);
        assert!(tool.parameters[0].required);
        assert!(!tool.parameters[1].required);
        assert_eq!(tool.parameters[1].auth_sources, vec!["google".to_string()]);
        assert_eq!(
            tool.parameters[1].items.as_ref().map(|i| i.param_type.as_str()),
            Some("string")
        );
    }
}
