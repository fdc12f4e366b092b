use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::settings::PacingSettings;
use crate::engine::error::ServiceError;
use crate::engine::protocol::{EngineCommand, EngineResponse};
use crate::engine::services::{ChoiceValidator, Clock, LevelProvider, Narrator};
use crate::engine::timers::{TimedTransition, TimerQueue};
use crate::model::game_state::{BattlePose, EnemyPose, GameState, Phase, PlayerPose};
use crate::model::level::{LevelData, FINAL_LEVEL};
use crate::model::llm_decode::DecodeError;

const LOADING_FIRST: &str = "正在翻阅《西游记》...";
const LOADING_NEXT: &str = "正在推演下一难...";
const RECONNECTING: &str = "信号被妖风阻断，正在重新连接...";
const STRANDED: &str = "妖风太盛，天庭失联。请稍后重新来过。";
const VALIDATION_NOTICE: &str = "法力不济，请再选一次。";

/// Collaborators the engine drives. Boxed so the UI root can pick real or
/// silent implementations at startup.
pub struct Services {
    pub levels: Box<dyn LevelProvider>,
    pub validator: Box<dyn ChoiceValidator>,
    pub narrator: Box<dyn Narrator>,
    pub clock: Box<dyn Clock>,
}

/// The game state machine. Runs on its own thread, receives commands from
/// the UI and answers with full state snapshots.
///
/// Every delayed transition is stamped with `generation`; starting a level,
/// submitting a choice or resetting bumps it, so callbacks scheduled for an
/// earlier action are dropped when they come due.
pub struct Engine {
    rx: Receiver<EngineCommand>,
    tx: Sender<EngineResponse>,
    services: Services,
    pacing: PacingSettings,
    rng: StdRng,

    state: GameState,
    timers: TimerQueue,
    generation: u64,
    attempts: u32,
}

impl Engine {
    pub fn new(
        rx: Receiver<EngineCommand>,
        tx: Sender<EngineResponse>,
        services: Services,
        pacing: PacingSettings,
    ) -> Self {
        Self {
            rx,
            tx,
            services,
            pacing,
            rng: StdRng::from_entropy(),
            state: GameState::new(),
            timers: TimerQueue::new(),
            generation: 0,
            attempts: 0,
        }
    }

    #[cfg(test)]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    #[cfg(test)]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn run(&mut self) {
        tracing::info!("engine started");
        self.publish();

        loop {
            let next = match self.timers.next_deadline() {
                Some(due) => {
                    let wait = due.saturating_duration_since(self.services.clock.now());
                    match self.rx.recv_timeout(wait) {
                        Ok(cmd) => Some(cmd),
                        Err(RecvTimeoutError::Timeout) => None,
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                None => match self.rx.recv() {
                    Ok(cmd) => Some(cmd),
                    Err(_) => break,
                },
            };

            if let Some(cmd) = next {
                if !self.handle(cmd) {
                    break;
                }
            }
            self.fire_due_timers();
        }

        self.services.narrator.stop();
        tracing::info!("engine stopped");
    }

    /// Returns false once the engine should shut down.
    pub fn handle(&mut self, cmd: EngineCommand) -> bool {
        match cmd {
            EngineCommand::StartGame => {
                if self.state.phase == Phase::Intro {
                    self.start_level(1);
                }
            }
            EngineCommand::SubmitChoice(name) => self.submit_choice(&name),
            EngineCommand::NextLevel => self.advance_level(),
            EngineCommand::Restart => self.reset_game(),
            EngineCommand::StopNarration => self.services.narrator.stop(),
            EngineCommand::Shutdown => return false,
        }
        true
    }

    /* =========================
       Operations
       ========================= */

    pub fn start_level(&mut self, level: u32) {
        let level = level.max(1);
        self.services.narrator.stop();
        self.bump_generation();
        self.attempts = 0;
        let loading = if level == 1 { LOADING_FIRST } else { LOADING_NEXT };
        self.state.status_line = loading.into();
        self.attempt_level(level);
    }

    pub fn submit_choice(&mut self, name: &str) {
        if self.state.phase != Phase::Playing {
            tracing::debug!(phase = ?self.state.phase, "choice ignored outside play");
            return;
        }
        let known = self
            .state
            .current_level
            .as_ref()
            .is_some_and(|level| level.choice(name).is_some());
        if !known {
            tracing::warn!(choice = name, "choice not offered by the current level");
            return;
        }

        self.state.phase = Phase::Resolving;
        self.state.notice = None;
        self.state.pose = BattlePose {
            player: PlayerPose::Attack,
            enemy: EnemyPose::Idle,
        };
        self.services.narrator.stop();
        let generation = self.bump_generation();
        self.publish();

        let result = match self.state.current_level.as_ref() {
            Some(level) => self.services.validator.validate_choice(level, name),
            None => return,
        };

        match result {
            Ok(outcome) => {
                tracing::info!(choice = name, success = outcome.success, "choice resolved");
                self.state.feedback = Some(outcome.narrative.clone());
                self.services.narrator.play(&outcome.narrative);

                let now = self.services.clock.now();
                if outcome.success {
                    self.state.pose.enemy = EnemyPose::Hit;
                    self.timers.schedule(
                        now,
                        self.pacing.enemy_fall_delay(),
                        generation,
                        TimedTransition::EnemyFalls,
                    );
                    self.timers.schedule(
                        now,
                        self.pacing.success_delay(),
                        generation,
                        TimedTransition::Triumph,
                    );
                } else {
                    self.state.pose = BattlePose {
                        player: PlayerPose::Hit,
                        enemy: EnemyPose::Attack,
                    };
                    self.timers.schedule(
                        now,
                        self.pacing.failure_delay(),
                        generation,
                        TimedTransition::Defeat,
                    );
                }
            }
            Err(err) => {
                tracing::warn!(choice = name, "validation failed, choice can be retried: {err}");
                self.state.phase = Phase::Playing;
                self.state.pose = BattlePose::default();
                self.state.notice = Some(VALIDATION_NOTICE.into());
            }
        }

        self.publish();
    }

    pub fn advance_level(&mut self) {
        if self.state.phase != Phase::Success {
            tracing::debug!(phase = ?self.state.phase, "next level ignored");
            return;
        }
        self.start_level(self.state.level_number + 1);
    }

    pub fn reset_game(&mut self) {
        self.services.narrator.stop();
        self.bump_generation();
        self.attempts = 0;
        self.state = GameState::new();
        tracing::info!(stale_timers = self.timers.len(), "game reset");
        self.publish();
    }

    pub fn fire_due_timers(&mut self) {
        let now = self.services.clock.now();
        for (generation, transition) in self.timers.take_due(now) {
            if generation != self.generation {
                tracing::debug!(?transition, "dropping stale transition");
                continue;
            }
            self.fire(transition);
        }
    }

    /* =========================
       Internals
       ========================= */

    fn bump_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn attempt_level(&mut self, level: u32) {
        self.state.phase = Phase::Loading;
        self.state.current_level = None;
        self.state.feedback = None;
        self.state.notice = None;
        self.state.pose = BattlePose::default();
        self.publish();

        match self.fetch_level(level) {
            Ok(mut data) => {
                self.attempts = 0;
                if self.pacing.shuffle_choices {
                    data.choices.shuffle(&mut self.rng);
                }
                let narration = data.intro_narration();
                tracing::info!(level, enemy = %data.enemy_name, "level ready");

                self.state.level_number = level;
                self.state.current_level = Some(data);
                self.state.phase = Phase::Playing;
                self.state.status_line.clear();
                self.publish();

                self.services.narrator.play(&narration);
            }
            Err(err) => {
                self.attempts += 1;
                tracing::warn!(level, attempt = self.attempts, "level generation failed: {err}");

                let exhausted = self
                    .pacing
                    .max_level_attempts
                    .is_some_and(|max| self.attempts >= max.max(1));
                if exhausted {
                    tracing::error!(level, "giving up on level generation");
                    self.state.phase = Phase::Stranded;
                    self.state.status_line = STRANDED.into();
                } else {
                    self.state.status_line = RECONNECTING.into();
                    self.timers.schedule(
                        self.services.clock.now(),
                        self.pacing.retry_delay(),
                        self.generation,
                        TimedTransition::RetryLevel { level },
                    );
                }
                self.publish();
            }
        }
    }

    fn fetch_level(&self, level: u32) -> Result<LevelData, ServiceError> {
        let data = self
            .services
            .levels
            .generate_level(level, &self.state.history)?;
        data.check().map_err(DecodeError::from)?;
        Ok(data)
    }

    fn fire(&mut self, transition: TimedTransition) {
        match transition {
            TimedTransition::RetryLevel { level } => self.attempt_level(level),
            TimedTransition::EnemyFalls => {
                self.state.pose.enemy = EnemyPose::Dead;
                self.publish();
            }
            TimedTransition::Triumph => {
                let Some(enemy) = self.state.enemy_name().map(str::to_string) else {
                    return;
                };
                self.state.score = self.state.score.saturating_add(self.pacing.score_per_level);
                self.state.history.push(enemy);
                self.state.phase = if self.state.level_number >= FINAL_LEVEL {
                    Phase::Victory
                } else {
                    Phase::Success
                };
                tracing::info!(score = self.state.score, "level cleared");
                self.publish();
            }
            TimedTransition::Defeat => {
                self.state.phase = Phase::GameOver;
                tracing::info!(score = self.state.score, "game over");
                self.publish();
            }
        }
    }

    fn publish(&self) {
        let _ = self.tx.send(EngineResponse::StateChanged(self.state.clone()));
    }
}
