use serde::Deserialize;

/// Outcome of using an artifact, as judged by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ValidationResult {
    pub success: bool,

    /// Storyteller-style account of what happened (at most a few sentences)
    pub narrative: String,
}
