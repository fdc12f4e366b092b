//! Test doubles shared by the unit tests: a hand-driven clock, scripted
//! collaborators and a fixture level.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::audio::pcm::PcmClip;
use crate::audio::player::AudioOutput;
use crate::audio::AudioError;
use crate::engine::error::ServiceError;
use crate::engine::services::{ChoiceValidator, Clock, LevelProvider, Narrator, SpeechSynthesizer};
use crate::model::level::{Choice, Difficulty, LevelData};
use crate::model::validation::ValidationResult;

/// The Red Boy (红孩儿) tribulation with the fan as the one right answer.
pub fn red_boy_level() -> LevelData {
    let choice = |name: &str, icon: &str, is_correct: bool| Choice {
        name: name.into(),
        description: format!("{name}的描述"),
        icon: icon.into(),
        is_correct,
    };

    LevelData {
        chapter: 40,
        title: "婴儿戏化禅心乱".into(),
        story: "号山枯松涧火云洞，红孩儿口吐三昧真火，悟空被烧得败下阵来。".into(),
        enemy_name: "红孩儿".into(),
        enemy_description: "赤发童子，手持火尖枪".into(),
        difficulty: Difficulty::Hard,
        choices: vec![
            choice("芭蕉扇", "🪭", true),
            choice("定风丹", "💊", false),
            choice("紫金红葫芦", "🏺", false),
            choice("金箍棒", "🥢", false),
        ],
        monster_image: None,
    }
}

/// A clock that only moves when the test says so.
#[derive(Debug, Clone)]
pub struct ManualClock(Arc<Mutex<Instant>>);

impl ManualClock {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(Instant::now())))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.0.lock().unwrap()
    }
}

/// Hands out queued results in order; records every request.
#[derive(Clone, Default)]
pub struct ScriptedLevels {
    script: Arc<Mutex<VecDeque<Result<LevelData, ServiceError>>>>,
    calls: Arc<Mutex<Vec<(u32, Vec<String>)>>>,
}

impl ScriptedLevels {
    pub fn push(&self, result: Result<LevelData, ServiceError>) {
        self.script.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> Vec<(u32, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl LevelProvider for ScriptedLevels {
    fn generate_level(&self, level: u32, defeated: &[String]) -> Result<LevelData, ServiceError> {
        self.calls.lock().unwrap().push((level, defeated.to_vec()));
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ServiceError::EmptyResponse("scripted level")))
    }
}

#[derive(Clone, Default)]
pub struct ScriptedValidator {
    script: Arc<Mutex<VecDeque<Result<ValidationResult, ServiceError>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedValidator {
    pub fn push(&self, result: Result<ValidationResult, ServiceError>) {
        self.script.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl ChoiceValidator for ScriptedValidator {
    fn validate_choice(
        &self,
        _level: &LevelData,
        chosen: &str,
    ) -> Result<ValidationResult, ServiceError> {
        self.calls.lock().unwrap().push(chosen.to_string());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ServiceError::EmptyResponse("scripted validation")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Narration {
    Play(String),
    Stop,
}

#[derive(Clone, Default)]
pub struct RecordingNarrator {
    events: Arc<Mutex<Vec<Narration>>>,
}

impl RecordingNarrator {
    pub fn events(&self) -> Vec<Narration> {
        self.events.lock().unwrap().clone()
    }
}

impl Narrator for RecordingNarrator {
    fn play(&mut self, text: &str) {
        self.events.lock().unwrap().push(Narration::Play(text.to_string()));
    }

    fn stop(&mut self) {
        self.events.lock().unwrap().push(Narration::Stop);
    }
}

/// Returns a short fixed clip for any text, or always fails.
#[derive(Clone, Default)]
pub struct FakeSynth {
    fail: bool,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeSynth {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl SpeechSynthesizer for FakeSynth {
    fn synthesize(&self, text: &str) -> Result<Vec<u8>, ServiceError> {
        self.requests.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(ServiceError::EmptyResponse("audio"));
        }
        Ok(vec![0x10, 0x00, 0x20, 0x00])
    }
}

#[derive(Debug, Clone, Default)]
pub struct OutputStats {
    pub starts: usize,
    pub stops: usize,
    pub ready_calls: usize,
    pub active: usize,
    pub max_active: usize,
}

#[derive(Default)]
struct OutputState {
    stats: OutputStats,
    fail_device: bool,
    finished: bool,
}

/// Audio backend that counts sources instead of making sound.
#[derive(Clone, Default)]
pub struct FakeOutput(Arc<Mutex<OutputState>>);

impl FakeOutput {
    pub fn stats(&self) -> OutputStats {
        self.0.lock().unwrap().stats.clone()
    }

    pub fn fail_device(&self, fail: bool) {
        self.0.lock().unwrap().fail_device = fail;
    }

    /// Pretends the current clip reached its end.
    pub fn finish(&self) {
        let mut state = self.0.lock().unwrap();
        state.finished = true;
        state.stats.active = 0;
    }
}

impl AudioOutput for FakeOutput {
    fn ensure_ready(&mut self) -> Result<(), AudioError> {
        let mut state = self.0.lock().unwrap();
        state.stats.ready_calls += 1;
        if state.fail_device {
            return Err(AudioError::Device("no device".into()));
        }
        Ok(())
    }

    fn start(&mut self, _clip: PcmClip) -> Result<(), AudioError> {
        let mut state = self.0.lock().unwrap();
        state.finished = false;
        state.stats.starts += 1;
        state.stats.active += 1;
        state.stats.max_active = state.stats.max_active.max(state.stats.active);
        Ok(())
    }

    fn stop(&mut self) {
        let mut state = self.0.lock().unwrap();
        state.stats.stops += 1;
        state.stats.active = state.stats.active.saturating_sub(1);
    }

    fn is_playing(&self) -> bool {
        let state = self.0.lock().unwrap();
        state.stats.active > 0 && !state.finished
    }
}
