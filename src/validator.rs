//! Validation of raw generation-service output.
//!
//! The model's reply is untrusted text that merely claims to be JSON. This
//! module turns it into a guaranteed `Vec<MeaningLine>` of length three or
//! fails with a diagnostic-carrying error. Pure transformation: no retries,
//! no side effects. Retry policy belongs to the caller.
//!
//! The check is strict: beyond requiring `lines` to be an array of length 3,
//! every element must carry a non-empty `title` and `body` and the ids must
//! be exactly `L1`, `L2`, `L3` in order.

use serde_json::Value;

use crate::error::{DreamError, Result};
use crate::model::{LineId, MeaningLine};

/// Parse and shape-check raw model output into exactly three meaning lines.
///
/// Failure modes:
/// - non-parseable text (prose, markdown fences) → [`DreamError::MalformedOutput`]
///   carrying the raw text;
/// - parseable but wrong shape (missing `lines`, wrong length, bad element
///   fields, out-of-order ids) → [`DreamError::UnexpectedShape`] carrying the
///   parsed value.
pub fn validate_lines(raw: &str) -> Result<Vec<MeaningLine>> {
    let value: Value = serde_json::from_str(raw.trim()).map_err(|_| DreamError::MalformedOutput {
        raw: raw.to_string(),
    })?;

    let lines_value = value
        .get("lines")
        .and_then(Value::as_array)
        .filter(|arr| arr.len() == 3)
        .ok_or_else(|| DreamError::UnexpectedShape {
            value: value.clone(),
        })?;

    let lines: Vec<MeaningLine> = serde_json::from_value(Value::Array(lines_value.clone()))
        .map_err(|_| DreamError::UnexpectedShape {
            value: value.clone(),
        })?;

    for (line, expected_id) in lines.iter().zip(LineId::ORDERED) {
        let well_formed = line.id == expected_id
            && !line.title.trim().is_empty()
            && !line.body.trim().is_empty();
        if !well_formed {
            return Err(DreamError::UnexpectedShape {
                value: value.clone(),
            });
        }
    }

    Ok(lines)
}
