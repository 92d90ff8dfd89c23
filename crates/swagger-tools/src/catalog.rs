//! Operation catalog: one tool descriptor per supported Swagger operation.

use crate::document::{HttpMethod, Operation, ParamLocation, Parameter, SwaggerDocument};
use crate::error::{Result, SwaggerToolsError};
use crate::naming::generate_tool_name;
use crate::schema::build_input_schema;
use rmcp::model::{JsonObject, Tool};
use std::collections::HashMap;
use std::sync::Arc;

/// A tool generated from a Swagger operation. Immutable once built.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    /// Tool name (exposed)
    pub name: String,
    /// `operationId` (if present)
    pub operation_id: Option<String>,
    pub description: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Path template (e.g., /pet/{petId})
    pub path: String,
    /// Merged path-item + operation parameters
    pub parameters: Vec<Parameter>,
    /// Input schema for MCP
    pub input_schema: Arc<JsonObject>,
}

impl ToolDescriptor {
    /// Build the descriptor for one (path, method) operation.
    #[must_use]
    pub fn from_operation(
        prefix: &str,
        method: HttpMethod,
        path: &str,
        path_params: &[Parameter],
        operation: &Operation,
    ) -> Self {
        let parameters = merge_parameters(path_params, &operation.parameters);
        let input_schema = build_input_schema(&parameters);

        Self {
            name: generate_tool_name(prefix, method, path, operation),
            operation_id: operation.operation_id.clone(),
            description: tool_description(operation, method, path),
            method,
            path: path.to_string(),
            parameters,
            input_schema: Arc::new(input_schema),
        }
    }

    /// The MCP `Tool` advertised in `tools/list`.
    #[must_use]
    pub fn to_tool(&self) -> Tool {
        let mut tool = Tool::new(
            self.name.clone(),
            self.description.clone(),
            Arc::clone(&self.input_schema),
        );
        tool.annotations = Some(crate::semantics::annotations_for_method(self.method));
        tool
    }
}

fn tool_description(operation: &Operation, method: HttpMethod, path: &str) -> String {
    operation
        .summary
        .clone()
        .or_else(|| operation.description.clone())
        .unwrap_or_else(|| format!("Calls {method} {path}"))
}

/// Operation parameters override path-item parameters with the same (name, location).
fn merge_parameters(path_params: &[Parameter], operation_params: &[Parameter]) -> Vec<Parameter> {
    let mut merged: Vec<Parameter> = Vec::with_capacity(path_params.len() + operation_params.len());
    let mut index: HashMap<(String, ParamLocation), usize> = HashMap::new();

    for p in path_params.iter().chain(operation_params) {
        let key = (p.name.clone(), p.location);
        if let Some(i) = index.get(&key).copied() {
            merged[i] = p.clone();
        } else {
            index.insert(key, merged.len());
            merged.push(p.clone());
        }
    }

    merged
}

/// The full set of tools for one document, in document order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tools: Vec<ToolDescriptor>,
    by_name: HashMap<String, usize>,
}

impl Catalog {
    /// Build the catalog for a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document has no `paths`, an operation is malformed, or two
    /// operations generate the same tool name.
    pub fn build(doc: &SwaggerDocument, prefix: &str) -> Result<Self> {
        let mut catalog = Catalog::default();
        let mut origins: Vec<String> = Vec::new();

        for (path, item) in doc.path_items()? {
            for (method, operation) in item.operations()? {
                let tool =
                    ToolDescriptor::from_operation(prefix, method, path, &item.parameters, &operation);
                let origin = format!("{method} {path}");

                if let Some(&existing) = catalog.by_name.get(&tool.name) {
                    return Err(SwaggerToolsError::Config(format!(
                        "Duplicate tool name '{}' generated for {} and {}",
                        tool.name, origins[existing], origin
                    )));
                }

                catalog.by_name.insert(tool.name.clone(), catalog.tools.len());
                catalog.tools.push(tool);
                origins.push(origin);
            }
        }

        Ok(catalog)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.by_name.get(name).map(|&i| &self.tools[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
