//! The demo resource wired by `build_app` and the black-box tests.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crudkit_core::{Entity, Factory, StoreError, StoreResult};

use crate::app::validate::CrudValidator;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

impl Entity for Widget {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WidgetFactory;

impl Factory<Widget> for WidgetFactory {
    fn make_entity(&self, raw: Value) -> StoreResult<Widget> {
        serde_json::from_value(raw).map_err(|e| StoreError::decode(e.to_string()))
    }

    fn make_object(&self, entity: &Widget) -> Value {
        json!({ "id": entity.id, "name": entity.name })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WidgetValidator;

impl CrudValidator for WidgetValidator {
    fn payload_create_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["name"],
            "properties": {
                "name": { "type": "string", "minLength": 1 }
            },
            "additionalProperties": false
        })
    }

    fn payload_update_schema(&self) -> Value {
        self.payload_create_schema()
    }

    fn params_id_schema(&self) -> Value {
        json!({
            "type": "string",
            "minLength": 1,
            "maxLength": 64,
            "pattern": "^[A-Za-z0-9_-]+$"
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn factory_round_trips_id_and_name() {
        let widget = Widget {
            id: Some("w1".to_string()),
            name: "foo".to_string(),
        };

        let raw = WidgetFactory.make_object(&widget);
        assert_eq!(raw, json!({ "id": "w1", "name": "foo" }));

        let back = WidgetFactory.make_entity(raw).unwrap();
        assert_eq!(back, widget);
    }

    #[test]
    fn make_entity_rejects_malformed_raw() {
        let err = WidgetFactory.make_entity(json!({ "id": 7 })).unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }

    proptest! {
        #[test]
        fn factory_round_trips_arbitrary_names(name in "[a-zA-Z0-9 ]{1,32}") {
            let widget = Widget { id: Some("w1".to_string()), name };
            let raw = WidgetFactory.make_object(&widget);
            let back = WidgetFactory.make_entity(raw).unwrap();
            prop_assert_eq!(back, widget);
        }
    }
}
