//! Datagram decoding
//!
//! Two-stage decode: UTF-8, then JSON object. Failure at either stage drops
//! the datagram. Recognized keys (`lat`, `lon`, `time`) are extracted
//! leniently: absent or non-numeric values become `None` and the payload is
//! still dispatched, per the permissive producer contract.

use contracts::{ContractError, ReportPayload};
use serde_json::Value;

/// Decode one datagram into a report payload.
///
/// # Errors
/// `Decode` when the bytes are not UTF-8, not JSON, or not a JSON object.
pub fn decode_datagram(bytes: &[u8]) -> Result<ReportPayload, ContractError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| ContractError::decode(format!("invalid utf-8: {e}")))?;

    let value: Value = serde_json::from_str(text)
        .map_err(|e| ContractError::decode(format!("invalid json: {e}")))?;

    let object = value
        .as_object()
        .ok_or_else(|| ContractError::decode("payload is not a json object"))?;

    Ok(ReportPayload {
        lat: object.get("lat").and_then(Value::as_f64),
        lon: object.get("lon").and_then(Value::as_f64),
        time: object.get("time").and_then(Value::as_i64),
    })
}
