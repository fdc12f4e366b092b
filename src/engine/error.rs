use thiserror::Error;

use crate::model::llm_decode::DecodeError;

/// Failures talking to the generative service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("no API key: set GEMINI_API_KEY or API_KEY")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("service returned no {0}")]
    EmptyResponse(&'static str),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("undecodable inline data: {0}")]
    Base64(#[from] base64::DecodeError),
}
