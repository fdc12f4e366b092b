use std::time::Instant;

use crate::engine::error::ServiceError;
use crate::model::level::LevelData;
use crate::model::validation::ValidationResult;

/// Produces the next tribulation.
pub trait LevelProvider: Send {
    /// `defeated` is a soft hint: the provider should avoid repeating these
    /// enemies but nothing enforces it.
    fn generate_level(&self, level: u32, defeated: &[String]) -> Result<LevelData, ServiceError>;
}

/// Judges whether the chosen artifact overcomes the level's enemy.
pub trait ChoiceValidator: Send {
    fn validate_choice(
        &self,
        level: &LevelData,
        chosen: &str,
    ) -> Result<ValidationResult, ServiceError>;
}

/// Turns text into raw 24 kHz mono 16-bit PCM.
pub trait SpeechSynthesizer: Send {
    fn synthesize(&self, text: &str) -> Result<Vec<u8>, ServiceError>;
}

/// Spoken narration as seen by the engine. Never fails: narration problems
/// are the narrator's business.
pub trait Narrator: Send {
    fn play(&mut self, text: &str);
    fn stop(&mut self);
}

pub trait Clock: Send {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Used when narration is switched off or no audio path is available.
#[derive(Debug, Default)]
pub struct SilentNarrator;

impl Narrator for SilentNarrator {
    fn play(&mut self, _text: &str) {}
    fn stop(&mut self) {}
}

/// Stands in for the generative service when no credential is configured;
/// every request fails so the engine's retry path reports it.
#[derive(Debug, Default)]
pub struct Unconfigured;

impl LevelProvider for Unconfigured {
    fn generate_level(&self, _level: u32, _defeated: &[String]) -> Result<LevelData, ServiceError> {
        Err(ServiceError::MissingApiKey)
    }
}

impl ChoiceValidator for Unconfigured {
    fn validate_choice(
        &self,
        _level: &LevelData,
        _chosen: &str,
    ) -> Result<ValidationResult, ServiceError> {
        Err(ServiceError::MissingApiKey)
    }
}
