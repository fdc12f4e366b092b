pub mod pcm;
pub mod player;
pub mod rodio_output;
pub mod worker;

use thiserror::Error;

use crate::engine::error::ServiceError;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("speech synthesis failed: {0}")]
    Synthesis(#[from] ServiceError),

    #[error("synthesized audio was empty")]
    EmptyPcm,

    #[error("audio device unavailable: {0}")]
    Device(String),
}
