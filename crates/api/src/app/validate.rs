//! Validator contract: the schema slots a concrete resource must supply.

use serde_json::{json, Value};

/// The three schema slots attached to a resource's routes: create payload
/// (POST), update payload (PUT), and the id path parameter (GET-by-id, PUT,
/// DELETE). Schemas are opaque JSON-Schema documents; the router compiles
/// and evaluates them before a request reaches the controller.
pub trait CrudValidator: Send + Sync {
    fn payload_create_schema(&self) -> Value;
    fn payload_update_schema(&self) -> Value;
    fn params_id_schema(&self) -> Value;
}

/// Shared, non-overridable schema for authenticated routes: an
/// `authorization` header must be present and non-empty; unknown headers
/// pass through.
pub fn auth_header_schema() -> Value {
    json!({
        "type": "object",
        "required": ["authorization"],
        "properties": {
            "authorization": { "type": "string", "minLength": 1 }
        },
        "additionalProperties": true
    })
}

pub(crate) fn compile(schema: &Value) -> anyhow::Result<jsonschema::Validator> {
    jsonschema::validator_for(schema).map_err(|e| anyhow::anyhow!("schema compile failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn auth_schema_requires_nonempty_authorization() {
        let schema = compile(&auth_header_schema()).unwrap();

        assert!(schema.is_valid(&json!({ "authorization": "Bearer t" })));
        assert!(schema.is_valid(&json!({ "authorization": "x", "accept": "*/*" })));
        assert!(!schema.is_valid(&json!({ "authorization": "" })));
        assert!(!schema.is_valid(&json!({})));
    }
}
