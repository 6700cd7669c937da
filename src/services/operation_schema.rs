use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::operation::Operation;

/// Hard cap on one operation batch coming from the assistant.
pub const MAX_OPERATIONS_PER_BATCH: usize = 25;

const DATE_PATTERN: &str = r"^\d{4}-\d{2}-\d{2}$";
const CLOCK_PATTERN: &str = r"^\d{2}:\d{2}$";
const NUMERIC_ID_PATTERN: &str = r"^\d+$";

static UPDATE_ACTIVITY_SCHEMA: Lazy<JsonValue> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "op": { "const": "update_activity" },
            "activityId": { "type": "string", "pattern": NUMERIC_ID_PATTERN },
            "date": { "type": "string", "pattern": DATE_PATTERN },
            "start": { "type": "string", "pattern": CLOCK_PATTERN },
            "end": { "type": "string", "pattern": CLOCK_PATTERN }
        },
        "required": ["op", "activityId"],
        "additionalProperties": false
    })
});

static REMOVE_ACTIVITY_SCHEMA: Lazy<JsonValue> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "op": { "const": "remove_activity" },
            "activityId": { "type": "string", "pattern": NUMERIC_ID_PATTERN }
        },
        "required": ["op", "activityId"],
        "additionalProperties": false
    })
});

static ADD_PLACE_SCHEMA: Lazy<JsonValue> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "op": { "const": "add_place" },
            "name": { "type": "string", "minLength": 1, "maxLength": 200 },
            "types": {
                "type": "array",
                "items": { "type": "string" },
                "maxItems": 10
            },
            "date": { "type": "string", "pattern": DATE_PATTERN },
            "start": { "type": "string", "pattern": CLOCK_PATTERN },
            "end": { "type": "string", "pattern": CLOCK_PATTERN }
        },
        "required": ["op", "name"],
        "additionalProperties": false
    })
});

fn schema_for(kind: &str) -> Option<&'static JsonValue> {
    match kind {
        "update_activity" => Some(&UPDATE_ACTIVITY_SCHEMA),
        "remove_activity" => Some(&REMOVE_ACTIVITY_SCHEMA),
        "add_place" => Some(&ADD_PLACE_SCHEMA),
        _ => None,
    }
}

/// Validate a batch of raw operations proposed by the assistant and decode
/// them into typed [`Operation`]s.
///
/// This is the one place the engine throws on malformed input: operations
/// come from the conversational layer, not from trusted upstream rows, and
/// applying a half-valid batch would corrupt the itinerary. Enforced here:
/// a known `op` tag, numeric-string ids, `date`/`start`/`end` present
/// together or not at all, and the batch size cap.
pub fn validate_operations(raw: &[JsonValue]) -> EngineResult<Vec<Operation>> {
    if raw.len() > MAX_OPERATIONS_PER_BATCH {
        return Err(EngineError::validation_with_details(
            "operation batch exceeds the cap",
            json!({ "count": raw.len(), "limit": MAX_OPERATIONS_PER_BATCH }),
        ));
    }

    let mut operations = Vec::with_capacity(raw.len());
    for (index, value) in raw.iter().enumerate() {
        let kind = value
            .get("op")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| EngineError::invalid_operation(index, "missing op tag"))?;

        let schema_value = schema_for(kind)
            .ok_or_else(|| EngineError::invalid_operation(index, format!("unknown op '{kind}'")))?;

        let schema = match JSONSchema::compile(schema_value) {
            Ok(schema) => schema,
            Err(error) => {
                warn!(target: "engine::operations", op = %kind, error = %error, "failed to compile operation schema");
                return Err(EngineError::invalid_operation(
                    index,
                    format!("schema for '{kind}' failed to compile: {error}"),
                ));
            }
        };

        if let Err(errors) = schema.validate(value) {
            let messages: Vec<String> = errors.map(|error| error.to_string()).collect();
            return Err(EngineError::invalid_operation(index, messages.join("; ")));
        }

        if matches!(kind, "update_activity" | "add_place") {
            let slot_fields = ["date", "start", "end"];
            let present = slot_fields
                .iter()
                .filter(|field| value.get(**field).is_some_and(|v| !v.is_null()))
                .count();
            if present != 0 && present != slot_fields.len() {
                return Err(EngineError::invalid_operation(
                    index,
                    "date, start, and end must be provided together",
                ));
            }
        }

        let operation: Operation = serde_json::from_value(value.clone())?;
        operations.push(operation);
    }

    debug!(
        target: "engine::operations",
        count = operations.len(),
        "validated operation batch"
    );
    Ok(operations)
}
