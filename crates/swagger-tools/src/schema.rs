//! Parameter type mapping and tool input schema generation.

use crate::document::Parameter;
use rmcp::model::JsonObject;
use serde_json::{Value, json};

/// Map a declared Swagger type to the tool schema primitive type.
///
/// Total: unknown or missing types map to `string`.
#[must_use]
pub fn map_type(declared: Option<&str>) -> &'static str {
    match declared {
        Some("integer") => "number",
        Some("boolean") => "boolean",
        Some("array") => "array",
        Some("object") => "object",
        _ => "string",
    }
}

/// Build the tool input schema from an operation's parameters.
///
/// Every parameter becomes a top-level property regardless of location, so body parameters share
/// the namespace of path/query parameters.
#[must_use]
pub fn build_input_schema(parameters: &[Parameter]) -> JsonObject {
    let mut properties = JsonObject::new();
    let mut required: Vec<Value> = Vec::new();

    for param in parameters {
        let tool_type = map_type(param.declared_type());
        let description = param
            .description
            .clone()
            .unwrap_or_else(|| format!("{} parameter", param.name));

        let mut prop = json!({
            "type": tool_type,
            "description": description,
        });
        if tool_type == "array" {
            prop["items"] = json!({ "type": map_type(param.item_type()) });
        }

        properties.insert(param.name.clone(), prop);

        if param.required {
            required.push(Value::String(param.name.clone()));
        }
    }

    let mut schema = JsonObject::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(properties));
    schema.insert("required".to_string(), Value::Array(required));
    schema
}
