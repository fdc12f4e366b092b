use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GameSettings {
    pub service: ServiceSettings,
    pub pacing: PacingSettings,
    pub ui: UiSettings,
}

/* =========================
   Generative service
   ========================= */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub tts_model: String,
    /// Prebuilt voice used for narration; a deep one suits the storyteller
    pub voice: String,
    pub request_timeout_secs: u64,
    pub generate_images: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            text_model: "gemini-3-flash-preview".into(),
            image_model: "gemini-2.5-flash-image".into(),
            tts_model: "gemini-2.5-flash-preview-tts".into(),
            voice: "Fenrir".into(),
            request_timeout_secs: 60,
            generate_images: true,
        }
    }
}

impl ServiceSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/* =========================
   Pacing & scoring
   ========================= */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingSettings {
    pub retry_delay_ms: u64,
    /// `None` keeps retrying forever
    pub max_level_attempts: Option<u32>,
    pub success_delay_ms: u64,
    pub failure_delay_ms: u64,
    pub enemy_fall_delay_ms: u64,
    pub score_per_level: u32,
    pub shuffle_choices: bool,
}

impl Default for PacingSettings {
    fn default() -> Self {
        Self {
            retry_delay_ms: 2000,
            max_level_attempts: Some(5),
            success_delay_ms: 3000,
            failure_delay_ms: 2000,
            enemy_fall_delay_ms: 800,
            score_per_level: 100,
            shuffle_choices: true,
        }
    }
}

impl PacingSettings {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn success_delay(&self) -> Duration {
        Duration::from_millis(self.success_delay_ms)
    }

    pub fn failure_delay(&self) -> Duration {
        Duration::from_millis(self.failure_delay_ms)
    }

    pub fn enemy_fall_delay(&self) -> Duration {
        Duration::from_millis(self.enemy_fall_delay_ms)
    }
}

/* =========================
   Presentation
   ========================= */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    pub ui_scale: f32,
    pub typewriter_chars_per_sec: f32,
    pub narration_enabled: bool,

    /// Font with CJK coverage; common system locations are tried when unset
    pub cjk_font_path: Option<PathBuf>,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            ui_scale: 1.0,
            typewriter_chars_per_sec: 30.0,
            narration_enabled: true,
            cjk_font_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_game_pacing() {
        let s = GameSettings::default();
        assert_eq!(s.pacing.retry_delay(), Duration::from_secs(2));
        assert_eq!(s.pacing.success_delay(), Duration::from_millis(3000));
        assert_eq!(s.pacing.failure_delay(), Duration::from_millis(2000));
        assert_eq!(s.pacing.score_per_level, 100);
        assert_eq!(s.service.voice, "Fenrir");
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let s: GameSettings =
            serde_json::from_str(r#"{"pacing": {"score_per_level": 50}}"#).unwrap();
        assert_eq!(s.pacing.score_per_level, 50);
        assert_eq!(s.pacing.retry_delay_ms, 2000);
        assert_eq!(s.ui, UiSettings::default());
    }

    #[test]
    fn null_attempt_budget_means_unlimited() {
        let s: GameSettings =
            serde_json::from_str(r#"{"pacing": {"max_level_attempts": null}}"#).unwrap();
        assert_eq!(s.pacing.max_level_attempts, None);
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let service = ServiceSettings {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(service.request_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn portraits_can_be_switched_off() {
        assert!(GameSettings::default().service.generate_images);

        let s: GameSettings =
            serde_json::from_str(r#"{"service": {"generate_images": false}}"#).unwrap();
        assert!(!s.service.generate_images);
        assert_eq!(s.service.voice, "Fenrir");
    }
}
