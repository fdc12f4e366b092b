use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::model::level::{LevelData, LevelError};
use crate::model::validation::ValidationResult;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid LLM output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed level: {0}")]
    Level(#[from] LevelError),
}

/// Models occasionally wrap JSON in a markdown fence even when asked not to.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // drop the optional language tag on the opening fence line
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => match rest.find(|c: char| c == '{' || c == '[') {
            Some(start) => &rest[start..],
            None => rest,
        },
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn decode_json<T: DeserializeOwned>(raw: &str) -> Result<T, DecodeError> {
    Ok(serde_json::from_str(strip_code_fence(raw))?)
}

/// Decode raw LLM JSON into a checked LevelData
pub fn decode_level(raw: &str) -> Result<LevelData, DecodeError> {
    let level: LevelData = decode_json(raw)?;
    level.check()?;
    Ok(level)
}

pub fn decode_validation(raw: &str) -> Result<ValidationResult, DecodeError> {
    decode_json(raw)
}
