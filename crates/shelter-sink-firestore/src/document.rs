//! Firestore document encoding and auto-IDs.

use chrono::SecondsFormat;
use serde_json::{Map, Value, json};
use shelter_core::ShelterRecord;
use uuid::Uuid;

use crate::error::{Result, SinkError};

/// Length of generated document ids.
pub const AUTO_ID_LENGTH: usize = 20;

const AUTO_ID_ALPHABET: &[u8; 62] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Largest multiple of the alphabet size that fits in a byte.
const UNBIASED_LIMIT: u8 = 248;

/// Generates a random 20-character document id from `[A-Za-z0-9]`.
pub fn auto_id() -> String {
    let mut id = String::with_capacity(AUTO_ID_LENGTH);
    while id.len() < AUTO_ID_LENGTH {
        // Bytes 6 and 8 carry the UUID version and variant bits.
        let random = Uuid::new_v4()
            .into_bytes()
            .into_iter()
            .enumerate()
            .filter(|(index, byte)| *index != 6 && *index != 8 && *byte < UNBIASED_LIMIT)
            .map(|(_, byte)| {
                char::from(AUTO_ID_ALPHABET[usize::from(byte) % AUTO_ID_ALPHABET.len()])
            });

        id.extend(random.take(AUTO_ID_LENGTH - id.len()));
    }
    id
}

/// Encodes a shelter record as Firestore document fields.
///
/// `last_verified_at` becomes a `timestampValue`; everything else follows
/// [`encode_value`].
pub fn encode_record(record: &ShelterRecord) -> Result<Map<String, Value>> {
    let value = serde_json::to_value(record).map_err(SinkError::Encode)?;

    let mut fields: Map<String, Value> = match value {
        Value::Object(object) => object
            .iter()
            .map(|(key, value)| (key.clone(), encode_value(value)))
            .collect(),
        _ => Map::new(),
    };

    fields.insert(
        "last_verified_at".to_string(),
        json!({
            "timestampValue": record
                .last_verified_at
                .to_rfc3339_opts(SecondsFormat::AutoSi, true)
        }),
    );

    Ok(fields)
}

/// Encodes a JSON value as a Firestore `Value`.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else if let Some(u) = n.as_u64() {
                json!({ "integerValue": u.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(object) => {
            let fields: Map<String, Value> = object
                .iter()
                .map(|(key, value)| (key.clone(), encode_value(value)))
                .collect();
            json!({ "mapValue": { "fields": fields } })
        }
    }
}
