use serde_json::Value;

use homework_common::error::{HomeworkError, Result};
use homework_common::types::ValidatedResponse;

/// Top-level fields allowed in a status payload: `homeworks` plus the cursor.
const MAX_FIELDS: usize = 2;

/// Check the payload shape and pull out the homework list and refresh cursor.
///
/// The payload must be an object holding at most two fields, one of which is
/// a `homeworks` list. The list is returned as-is, possibly empty.
pub fn validate(response: &Value) -> Result<ValidatedResponse> {
    let Value::Object(fields) = response else {
        return Err(HomeworkError::MalformedResponse(format!(
            "expected a JSON object, got {}",
            kind(response)
        )));
    };

    if fields.len() > MAX_FIELDS {
        return Err(HomeworkError::MalformedResponse(format!(
            "expected at most {MAX_FIELDS} top-level fields, got {}",
            fields.len()
        )));
    }

    let homeworks = match fields.get("homeworks") {
        Some(Value::Array(list)) => list.clone(),
        Some(other) => {
            return Err(HomeworkError::MalformedResponse(format!(
                "`homeworks` must be a list, got {}",
                kind(other)
            )));
        }
        None => {
            return Err(HomeworkError::MalformedResponse(
                "missing `homeworks` field".to_string(),
            ));
        }
    };

    let current_date = match fields.get("current_date") {
        Some(value) => {
            let date = value.as_i64();
            if date.is_none() {
                tracing::warn!(current_date = %value, "Ignoring non-integer current_date");
            }
            date
        }
        None => None,
    };

    Ok(ValidatedResponse {
        homeworks,
        current_date,
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
