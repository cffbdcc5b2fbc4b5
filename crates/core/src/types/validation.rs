//! Backend error payloads.
//!
//! The backend answers failed writes either with `{"message": "..."}` or,
//! for account validation failures, with a map of field name to one message
//! or a list of messages. Both are turned into a single display string.

use core::fmt;

use serde_json::Value;

/// Field-level validation errors, in the order the backend sent them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors(Vec<(String, Vec<String>)>);

impl FieldErrors {
    /// Interpret a JSON error body as field errors.
    ///
    /// Returns `None` unless the body is a non-empty object without a
    /// `message` key.
    #[must_use]
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let object = payload.as_object()?;
        if object.is_empty() || object.contains_key("message") {
            return None;
        }

        let fields = object
            .iter()
            .map(|(field, messages)| {
                let messages = match messages {
                    Value::Array(items) => items.iter().map(value_text).collect(),
                    other => vec![value_text(other)],
                };
                (field.clone(), messages)
            })
            .collect();

        Some(Self(fields))
    }
}

/// `field: first, second; other: message`
impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, messages)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {}", messages.join(", "))?;
        }
        Ok(())
    }
}

/// Turn any backend error body into one human-readable line.
///
/// Field errors are concatenated, a `message` is shown as-is and anything
/// else is shown as raw JSON.
#[must_use]
pub fn describe_error_payload(payload: &Value) -> String {
    if let Some(errors) = FieldErrors::from_payload(payload) {
        return errors.to_string();
    }
    match payload.get("message") {
        Some(Value::String(message)) if !message.is_empty() => message.clone(),
        _ => match payload {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        },
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
