//! Static tool catalogue: declares, for each tool name, the argument schema
//! exposed to the LLM and the backend HTTP request shape it projects onto.

use hg_domain::tool::ToolDefinition;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// One entry in the closed tool catalogue.
pub struct ToolDeclaration {
    pub name: &'static str,
    pub description: &'static str,
    pub method: HttpMethod,
    /// Path template with `{field}` placeholders substituted from arguments.
    pub path_template: &'static str,
    /// Argument names that are substituted into `path_template` rather than
    /// sent in the request body.
    pub path_params: &'static [&'static str],
    pub parameters: fn() -> Value,
}

pub struct ToolRegistry {
    declarations: Vec<ToolDeclaration>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            declarations: catalogue(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ToolDeclaration> {
        self.declarations.iter().find(|d| d.name == name)
    }

    /// Build the tool definitions exposed to the LLM, in catalogue order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.declarations
            .iter()
            .map(|d| ToolDefinition {
                name: d.name.to_string(),
                description: d.description.to_string(),
                parameters: (d.parameters)(),
            })
            .collect()
    }

    /// Validate `arguments` against the declared schema's required fields
    /// and basic type constraints. Returns a human-readable detail string
    /// on the first violation found.
    pub fn validate(&self, name: &str, arguments: &Value) -> Result<(), String> {
        let decl = self.get(name).ok_or_else(|| format!("unknown tool '{name}'"))?;
        let schema = (decl.parameters)();
        let required = schema
            .get("required")
            .and_then(|r| r.as_array())
            .map(|a| a.iter().filter_map(|v| v.as_str()).collect::<Vec<_>>())
            .unwrap_or_default();

        for field in &required {
            if arguments.get(field).is_none() {
                return Err(format!("missing required field '{field}'"));
            }
        }

        if let Some(props) = schema.get("properties").and_then(|p| p.as_object()) {
            for (field, prop_schema) in props {
                let Some(value) = arguments.get(field) else { continue };
                let Some(expected_type) = prop_schema.get("type").and_then(|t| t.as_str()) else { continue };
                let matches = match expected_type {
                    "string" => value.is_string(),
                    "integer" => value.is_i64() || value.is_u64(),
                    "number" => value.is_number(),
                    "boolean" => value.is_boolean(),
                    "object" => value.is_object(),
                    "array" => value.is_array(),
                    _ => true,
                };
                if !matches {
                    return Err(format!("field '{field}' expected type '{expected_type}'"));
                }
                if expected_type == "integer" {
                    if let Some(min) = prop_schema.get("minimum").and_then(|m| m.as_i64()) {
                        if value.as_i64().map(|v| v < min).unwrap_or(false) {
                            return Err(format!("field '{field}' must be >= {min}"));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Substitute path params into the template and return the remaining
    /// fields as the body (for verbs that carry one).
    pub fn project(&self, name: &str, arguments: &Value) -> Result<(String, Value), String> {
        let decl = self.get(name).ok_or_else(|| format!("unknown tool '{name}'"))?;
        let mut path = decl.path_template.to_string();
        for param in decl.path_params {
            let value = arguments
                .get(*param)
                .ok_or_else(|| format!("missing path parameter '{param}'"))?;
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            path = path.replace(&format!("{{{param}}}"), &rendered);
        }

        let mut body = arguments.clone();
        if let Some(obj) = body.as_object_mut() {
            for param in decl.path_params {
                obj.remove(*param);
            }
        }

        Ok((path, body))
    }
}

macro_rules! schema {
    ($props:tt, $required:expr) => {
        || serde_json::json!({ "type": "object", "properties": $props, "required": $required })
    };
}

fn catalogue() -> Vec<ToolDeclaration> {
    vec![
        ToolDeclaration {
            name: "rooms_list",
            description: "List all rooms.",
            method: HttpMethod::Get,
            path_template: "/api/v1/rooms",
            path_params: &[],
            parameters: schema!({}, []),
        },
        ToolDeclaration {
            name: "rooms_get",
            description: "Get a room by id.",
            method: HttpMethod::Get,
            path_template: "/api/v1/rooms/{id}",
            path_params: &["id"],
            parameters: schema!({"id": {"type": "string"}}, ["id"]),
        },
        ToolDeclaration {
            name: "rooms_filter",
            description: "Filter rooms by availability window and occupancy.",
            method: HttpMethod::Post,
            path_template: "/api/v1/rooms/filter",
            path_params: &[],
            parameters: schema!({
                "checkInDate": {"type": "string", "description": "YYYY-MM-DD"},
                "checkOutDate": {"type": "string", "description": "YYYY-MM-DD"},
                "numberOfAdults": {"type": "integer", "minimum": 1},
                "numberOfChildren": {"type": "integer", "minimum": 0}
            }, ["checkInDate", "checkOutDate", "numberOfAdults"]),
        },
        ToolDeclaration {
            name: "reservations_list",
            description: "List reservations.",
            method: HttpMethod::Get,
            path_template: "/api/v1/reservations",
            path_params: &[],
            parameters: schema!({}, []),
        },
        ToolDeclaration {
            name: "reservations_get",
            description: "Get a reservation by id.",
            method: HttpMethod::Get,
            path_template: "/api/v1/reservations/{id}",
            path_params: &["id"],
            parameters: schema!({"id": {"type": "string"}}, ["id"]),
        },
        ToolDeclaration {
            name: "reservations_create",
            description: "Create a room reservation.",
            method: HttpMethod::Post,
            path_template: "/api/v1/reservations",
            path_params: &[],
            parameters: schema!({
                "roomId": {"type": "string"},
                "checkInDate": {"type": "string", "description": "YYYY-MM-DD"},
                "checkOutDate": {"type": "string", "description": "YYYY-MM-DD"},
                "numberOfAdults": {"type": "integer", "minimum": 1},
                "numberOfChildren": {"type": "integer", "minimum": 0}
            }, ["roomId", "checkInDate", "checkOutDate", "numberOfAdults"]),
        },
        ToolDeclaration {
            name: "reservations_update",
            description: "Update an existing reservation.",
            method: HttpMethod::Put,
            path_template: "/api/v1/reservations/{id}",
            path_params: &["id"],
            parameters: schema!({
                "id": {"type": "string"},
                "checkInDate": {"type": "string", "description": "YYYY-MM-DD"},
                "checkOutDate": {"type": "string", "description": "YYYY-MM-DD"},
                "numberOfAdults": {"type": "integer", "minimum": 1}
            }, ["id"]),
        },
        ToolDeclaration {
            name: "reservations_cancel",
            description: "Cancel a reservation.",
            method: HttpMethod::Delete,
            path_template: "/api/v1/reservations/{id}",
            path_params: &["id"],
            parameters: schema!({"id": {"type": "string"}}, ["id"]),
        },
        ToolDeclaration {
            name: "restaurant_menu",
            description: "Get the restaurant menu.",
            method: HttpMethod::Get,
            path_template: "/api/v1/restaurant/menu",
            path_params: &[],
            parameters: schema!({}, []),
        },
        ToolDeclaration {
            name: "restaurant_table_list",
            description: "List restaurant table reservations.",
            method: HttpMethod::Get,
            path_template: "/api/v1/restaurant/reservations",
            path_params: &[],
            parameters: schema!({}, []),
        },
        ToolDeclaration {
            name: "restaurant_table_get",
            description: "Get a restaurant table reservation by id.",
            method: HttpMethod::Get,
            path_template: "/api/v1/restaurant/reservations/{id}",
            path_params: &["id"],
            parameters: schema!({"id": {"type": "string"}}, ["id"]),
        },
        ToolDeclaration {
            name: "restaurant_table_create",
            description: "Create a restaurant table reservation.",
            method: HttpMethod::Post,
            path_template: "/api/v1/restaurant/reservations",
            path_params: &[],
            parameters: schema!({
                "date": {"type": "string", "description": "YYYY-MM-DD"},
                "time": {"type": "string", "description": "HH:MM"},
                "numberOfAdults": {"type": "integer", "minimum": 1}
            }, ["date", "time", "numberOfAdults"]),
        },
        ToolDeclaration {
            name: "restaurant_table_update",
            description: "Update a restaurant table reservation.",
            method: HttpMethod::Put,
            path_template: "/api/v1/restaurant/reservations/{id}",
            path_params: &["id"],
            parameters: schema!({
                "id": {"type": "string"},
                "date": {"type": "string", "description": "YYYY-MM-DD"},
                "time": {"type": "string", "description": "HH:MM"},
                "numberOfAdults": {"type": "integer", "minimum": 1}
            }, ["id"]),
        },
        ToolDeclaration {
            name: "restaurant_table_cancel",
            description: "Cancel a restaurant table reservation.",
            method: HttpMethod::Delete,
            path_template: "/api/v1/restaurant/reservations/{id}",
            path_params: &["id"],
            parameters: schema!({"id": {"type": "string"}}, ["id"]),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_has_fourteen_tools() {
        assert_eq!(ToolRegistry::new().declarations.len(), 14);
    }

    #[test]
    fn unknown_tool_is_rejected() {
        let reg = ToolRegistry::new();
        assert!(reg.validate("not_a_tool", &serde_json::json!({})).is_err());
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let reg = ToolRegistry::new();
        let err = reg.validate("rooms_get", &serde_json::json!({})).unwrap_err();
        assert!(err.contains("id"));
    }

    #[test]
    fn wrong_type_is_rejected() {
        let reg = ToolRegistry::new();
        let err = reg
            .validate("rooms_filter", &serde_json::json!({"checkInDate": "2026-08-01", "checkOutDate": "2026-08-05", "numberOfAdults": "two"}))
            .unwrap_err();
        assert!(err.contains("numberOfAdults"));
    }

    #[test]
    fn number_of_adults_below_minimum_is_rejected() {
        let reg = ToolRegistry::new();
        let err = reg
            .validate("rooms_filter", &serde_json::json!({"checkInDate": "2026-08-01", "checkOutDate": "2026-08-05", "numberOfAdults": 0}))
            .unwrap_err();
        assert!(err.contains("numberOfAdults"));
    }

    #[test]
    fn valid_arguments_pass() {
        let reg = ToolRegistry::new();
        assert!(reg
            .validate("rooms_filter", &serde_json::json!({"checkInDate": "2026-08-01", "checkOutDate": "2026-08-05", "numberOfAdults": 2}))
            .is_ok());
    }

    #[test]
    fn project_substitutes_path_param_and_strips_it_from_body() {
        let reg = ToolRegistry::new();
        let (path, body) = reg.project("reservations_update", &serde_json::json!({"id": "r1", "numberOfAdults": 3})).unwrap();
        assert_eq!(path, "/api/v1/reservations/r1");
        assert!(body.get("id").is_none());
        assert_eq!(body.get("numberOfAdults").unwrap(), 3);
    }

    #[test]
    fn project_missing_path_param_is_an_error() {
        let reg = ToolRegistry::new();
        assert!(reg.project("rooms_get", &serde_json::json!({})).is_err());
    }
}
