use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::settings::ServiceSettings;
use crate::engine::error::ServiceError;
use crate::engine::prompt_builder::PromptBuilder;
use crate::engine::services::{ChoiceValidator, LevelProvider, SpeechSynthesizer};
use crate::model::level::{LevelData, MonsterImage};
use crate::model::llm_decode::{decode_level, decode_validation};
use crate::model::validation::ValidationResult;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

impl GenerateContentRequest {
    fn prompt(text: String, generation_config: Value) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(text),
                    inline_data: None,
                }],
            }],
            generation_config,
        }
    }

    pub fn json(text: String, schema: Value) -> Self {
        Self::prompt(
            text,
            json!({
                "responseMimeType": "application/json",
                "responseSchema": schema,
            }),
        )
    }

    pub fn image(text: String) -> Self {
        Self::prompt(
            text,
            json!({
                "responseModalities": ["IMAGE"],
                "imageConfig": { "aspectRatio": "1:1" },
            }),
        )
    }

    pub fn speech(text: String, voice: &str) -> Self {
        Self::prompt(
            text,
            json!({
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": { "voiceName": voice }
                    }
                }
            }),
        )
    }
}

impl GenerateContentResponse {
    fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .into_iter()
            .flat_map(|c| c.parts.iter())
    }

    /// All text parts of the first candidate, concatenated.
    pub fn text(&self) -> Option<String> {
        let text: String = self.parts().filter_map(|p| p.text.as_deref()).collect();
        (!text.trim().is_empty()).then_some(text)
    }

    pub fn inline_data(&self) -> Option<&InlineData> {
        self.parts().find_map(|p| p.inline_data.as_ref())
    }
}

pub fn level_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "chapter": { "type": "INTEGER", "description": "原著大概章节数" },
            "title": { "type": "STRING", "description": "关卡标题" },
            "story": { "type": "STRING", "description": "故事描述" },
            "enemyName": { "type": "STRING", "description": "妖怪名字" },
            "enemyDescription": { "type": "STRING", "description": "妖怪外貌描述（用于生成图片）" },
            "difficulty": { "type": "STRING", "enum": ["Hard", "Extreme"] },
            "artifacts": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "description": { "type": "STRING", "description": "简短描述" },
                        "icon": { "type": "STRING", "description": "代表道具的Emoji" },
                        "isCorrect": { "type": "BOOLEAN" }
                    },
                    "required": ["name", "description", "icon", "isCorrect"]
                }
            }
        },
        "required": ["chapter", "title", "story", "enemyName", "enemyDescription", "artifacts", "difficulty"]
    })
}

pub fn validation_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "success": { "type": "BOOLEAN" },
            "narrative": { "type": "STRING", "description": "结果的戏剧性叙述（最多3句话）。" }
        },
        "required": ["success", "narrative"]
    })
}

/// Blocking client for the Gemini `generateContent` endpoint.
/// Cheap to clone: the underlying connection pool is shared.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    settings: ServiceSettings,
    api_key: String,
}

impl GeminiClient {
    pub fn new(settings: ServiceSettings, api_key: String) -> Result<Self, ServiceError> {
        if api_key.trim().is_empty() {
            return Err(ServiceError::MissingApiKey);
        }

        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()?;

        Ok(Self {
            http,
            settings,
            api_key,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            model
        )
    }

    pub fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ServiceError> {
        let resp = self
            .http
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.json()?)
    }

    pub fn monster_image(&self, level: &LevelData) -> Result<MonsterImage, ServiceError> {
        let request = GenerateContentRequest::image(PromptBuilder::monster_image(level));
        let response = self.generate(&self.settings.image_model, &request)?;
        let inline = response
            .inline_data()
            .ok_or(ServiceError::EmptyResponse("image"))?;

        Ok(MonsterImage {
            mime_type: inline.mime_type.clone(),
            bytes: BASE64.decode(&inline.data)?,
        })
    }
}

/// Image generation is best effort: a failure only costs the portrait.
pub fn attach_monster_image(level: &mut LevelData, image: Result<MonsterImage, ServiceError>) {
    match image {
        Ok(image) => level.monster_image = Some(Arc::new(image)),
        Err(err) => {
            tracing::warn!(enemy = %level.enemy_name, "monster image unavailable: {err}");
        }
    }
}

impl LevelProvider for GeminiClient {
    fn generate_level(&self, level: u32, defeated: &[String]) -> Result<LevelData, ServiceError> {
        let request = GenerateContentRequest::json(PromptBuilder::level(level, defeated), level_schema());
        let raw = self
            .generate(&self.settings.text_model, &request)?
            .text()
            .ok_or(ServiceError::EmptyResponse("level"))?;

        let mut data = decode_level(&raw)?;
        tracing::info!(level, enemy = %data.enemy_name, "level generated");

        if self.settings.generate_images {
            let image = self.monster_image(&data);
            attach_monster_image(&mut data, image);
        }

        Ok(data)
    }
}

impl ChoiceValidator for GeminiClient {
    fn validate_choice(
        &self,
        level: &LevelData,
        chosen: &str,
    ) -> Result<ValidationResult, ServiceError> {
        let request =
            GenerateContentRequest::json(PromptBuilder::validation(level, chosen), validation_schema());
        let raw = self
            .generate(&self.settings.text_model, &request)?
            .text()
            .ok_or(ServiceError::EmptyResponse("validation"))?;

        Ok(decode_validation(&raw)?)
    }
}

impl SpeechSynthesizer for GeminiClient {
    fn synthesize(&self, text: &str) -> Result<Vec<u8>, ServiceError> {
        let request = GenerateContentRequest::speech(text.to_string(), &self.settings.voice);
        let response = self.generate(&self.settings.tts_model, &request)?;
        let inline = response
            .inline_data()
            .ok_or(ServiceError::EmptyResponse("audio"))?;

        Ok(BASE64.decode(&inline.data)?)
    }
}
