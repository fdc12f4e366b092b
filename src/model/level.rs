use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

/// Number of artifacts every level offers.
pub const CHOICES_PER_LEVEL: usize = 4;

/// The 81st tribulation closes the pilgrimage.
pub const FINAL_LEVEL: u32 = 81;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Difficulty {
    Hard,
    Extreme,
}

/// One selectable artifact (法宝).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub name: String,
    pub description: String,
    /// Emoji or single glyph shown on the card
    pub icon: String,
    pub is_correct: bool,
}

/// Generated monster portrait, kept as encoded bytes until the UI uploads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonsterImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// A single tribulation as produced by the level provider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelData {
    /// Approximate chapter (回) of the novel
    pub chapter: u32,
    pub title: String,
    pub story: String,
    pub enemy_name: String,
    pub enemy_description: String,
    pub difficulty: Difficulty,
    #[serde(rename = "artifacts")]
    pub choices: Vec<Choice>,

    #[serde(skip)]
    pub monster_image: Option<Arc<MonsterImage>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelError {
    #[error("expected 4 artifacts, got {0}")]
    WrongChoiceCount(usize),

    #[error("expected exactly one correct artifact, got {0}")]
    CorrectCount(usize),

    #[error("artifact name '{0}' appears more than once")]
    DuplicateChoice(String),

    #[error("artifact with an empty name")]
    EmptyChoiceName,
}

impl LevelData {
    /// Checks the shape the rest of the game relies on: four artifacts,
    /// exactly one of them correct, names unique and non-empty.
    pub fn check(&self) -> Result<(), LevelError> {
        if self.choices.len() != CHOICES_PER_LEVEL {
            return Err(LevelError::WrongChoiceCount(self.choices.len()));
        }

        let mut seen = HashSet::new();
        for choice in &self.choices {
            let name = choice.name.trim();
            if name.is_empty() {
                return Err(LevelError::EmptyChoiceName);
            }
            if !seen.insert(name) {
                return Err(LevelError::DuplicateChoice(name.to_string()));
            }
        }

        let correct = self.choices.iter().filter(|c| c.is_correct).count();
        if correct != 1 {
            return Err(LevelError::CorrectCount(correct));
        }

        Ok(())
    }

    pub fn correct_choice(&self) -> Option<&Choice> {
        self.choices.iter().find(|c| c.is_correct)
    }

    pub fn choice(&self, name: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.name == name)
    }

    /// Text read aloud when the level opens.
    pub fn intro_narration(&self) -> String {
        format!("第{}回。{}。{}", self.chapter, self.title, self.story)
    }
}
