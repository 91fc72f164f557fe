//! The service's optional `{code, message, data}` response wrapper.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

/// Non-zero envelope code, carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRejection {
    pub code: i64,
    pub message: String,
}

/// Message used when a rejecting envelope carries no usable `message`.
pub const REJECTED_WITHOUT_MESSAGE: &str = "request rejected by service";

impl<T> Envelope<T> {
    pub fn into_result(self) -> Result<Option<T>, ServiceRejection> {
        if self.code == 0 {
            Ok(self.data)
        } else {
            let message = if self.message.trim().is_empty() {
                format!("{} (code {})", REJECTED_WITHOUT_MESSAGE, self.code)
            } else {
                self.message
            };
            Err(ServiceRejection {
                code: self.code,
                message,
            })
        }
    }
}

/// Strip the envelope if `body` is one.
///
/// Any object with a `code` key is an envelope. The code may be an integer
/// or a string holding one; anything else is an unreadable envelope.
/// `message` is optional. Other bodies pass through untouched. A successful
/// envelope without `data` yields `null`.
pub fn unwrap_envelope(body: Value) -> Result<Value, ServiceRejection> {
    let mut map = match body {
        Value::Object(map) if map.contains_key("code") => map,
        other => return Ok(other),
    };
    let code = map
        .get("code")
        .and_then(envelope_code)
        .ok_or_else(|| ServiceRejection {
            code: -1,
            message: format!(
                "unreadable envelope code: {}",
                map.get("code").map(Value::to_string).unwrap_or_default()
            ),
        })?;
    let message = match map.remove("message") {
        Some(Value::String(message)) => message,
        _ => String::new(),
    };
    let envelope = Envelope {
        code,
        message,
        data: map.remove("data").filter(|data| !data.is_null()),
    };
    envelope.into_result().map(|data| data.unwrap_or(Value::Null))
}

fn envelope_code(code: &Value) -> Option<i64> {
    match code {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
