use serde_json::Value;

use homework_common::error::{HomeworkError, Result};
use homework_common::types::HomeworkStatus;

/// Render one homework record as the notification sent to the student.
///
/// Both `homework_name` and `status` must be present and non-empty, and the
/// status must be one the lexicon knows. Failures are logged here so they
/// are recorded even though the poll loop handles them upstream.
pub fn format_status(record: &Value) -> Result<String> {
    let name = required_field(record, "homework_name")?;
    let raw_status = required_field(record, "status")?;

    let status = match raw_status.as_str().map(str::parse::<HomeworkStatus>) {
        Some(Ok(status)) => status,
        _ => {
            let code = display_value(raw_status);
            tracing::error!(status = %code, "Undocumented homework status");
            return Err(HomeworkError::UnknownStatus(code));
        }
    };

    Ok(format!(
        "Изменился статус проверки работы \"{}\". {}",
        display_value(name),
        status.verdict()
    ))
}

fn required_field<'a>(record: &'a Value, field: &'static str) -> Result<&'a Value> {
    match record.get(field) {
        Some(value) if is_present(value) => Ok(value),
        _ => {
            tracing::error!(field, "Homework record is missing a required field");
            Err(HomeworkError::MissingField(field))
        }
    }
}

/// Null, `false`, zero and empty values count as absent.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
