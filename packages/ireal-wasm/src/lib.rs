use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct DecodeError {
    message: String,
    kind: &'static str,
}

impl From<ireal::IrealError> for DecodeError {
    fn from(e: ireal::IrealError) -> Self {
        let kind = match &e {
            ireal::IrealError::UnknownKey { .. } => "unknown-key",
            ireal::IrealError::NoCharts => "no-charts",
            ireal::IrealError::ChartIndex { .. } => "chart-index",
        };
        DecodeError {
            message: e.to_string(),
            kind,
        }
    }
}

fn to_js_error(error: DecodeError) -> JsValue {
    let json = serde_json::to_string(&error).unwrap_or_else(|_| error.message.clone());
    JsValue::from_str(&json)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| {
        to_js_error(DecodeError {
            message: e.to_string(),
            kind: "serialize",
        })
    })
}

/// Decode an irealb:// link or text dump to a JSON array of charts
#[wasm_bindgen]
pub fn decode(input: &str) -> Result<String, JsValue> {
    let charts = ireal::decode(input).map_err(|e| to_js_error(e.into()))?;
    to_json(&charts)
}

/// Decode and transpose every chart to `key`
#[wasm_bindgen]
pub fn decode_transposed(input: &str, key: &str) -> Result<String, JsValue> {
    let charts = ireal::decode_transposed(input, key).map_err(|e| to_js_error(e.into()))?;
    to_json(&charts)
}

/// Plaintext notation of a music payload
#[wasm_bindgen]
pub fn unscramble(payload: &str) -> String {
    ireal::unscramble(payload)
}

/// Supported transposition keys as a JSON array
#[wasm_bindgen]
pub fn supported_keys() -> String {
    let keys: Vec<&str> = ireal::supported_keys().collect();
    serde_json::to_string(&keys).unwrap_or_else(|_| "[]".to_string())
}

/// First-choice scale for a chord as a JS object, or `null` for rootless chords
#[wasm_bindgen]
pub fn chord_scale(chord: &str) -> Result<JsValue, JsValue> {
    match ireal::chord_scale(chord) {
        Some(scale) => serde_wasm_bindgen::to_value(&scale).map_err(JsValue::from),
        None => Ok(JsValue::NULL),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_keys_json() {
        let keys: Vec<String> = serde_json::from_str(&supported_keys()).unwrap();
        assert_eq!(keys.len(), 48);
        assert_eq!(keys[0], "C");
    }

    #[test]
    fn test_error_kinds() {
        let error = DecodeError::from(ireal::IrealError::NoCharts);
        assert_eq!(error.kind, "no-charts");
        assert_eq!(error.message, "No charts found in input");
    }

    #[test]
    fn test_unscramble_passthrough() {
        assert_eq!(unscramble("[C |G Z"), "[C |G Z");
    }
}
