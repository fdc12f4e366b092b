use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use eframe::egui;

use crate::audio::rodio_output::RodioOutput;
use crate::audio::worker::AudioPlayer;
use crate::config::api_key_from_env;
use crate::config::settings::GameSettings;
use crate::config::settings_io::save_settings;
use crate::engine::engine::{Engine, Services};
use crate::engine::llm_client::GeminiClient;
use crate::engine::protocol::{EngineCommand, EngineResponse};
use crate::engine::services::{Narrator, SilentNarrator, SystemClock, Unconfigured};
use crate::model::game_state::{GameState, Phase};
use crate::shutdown::join_within;
use crate::ui::fonts::install_cjk_font;
use crate::ui::portrait::PortraitCache;
use crate::ui::screens;
use crate::ui::typewriter::Typewriter;

/// How long closing the window waits for the engine thread.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Picks real or stand-in collaborators depending on what is configured.
/// Returns whether the service credential is missing.
fn build_services(settings: &GameSettings) -> (Services, bool) {
    let client = match api_key_from_env() {
        Some(key) => match GeminiClient::new(settings.service.clone(), key) {
            Ok(client) => Some(client),
            Err(err) => {
                tracing::error!("generative service unavailable: {err}");
                None
            }
        },
        None => {
            tracing::warn!("no API key in the environment");
            None
        }
    };
    let missing = client.is_none();

    let services = match client {
        Some(client) => {
            let narrator: Box<dyn Narrator> = if settings.ui.narration_enabled {
                Box::new(AudioPlayer::spawn(client.clone(), RodioOutput::new))
            } else {
                Box::new(SilentNarrator)
            };
            Services {
                levels: Box::new(client.clone()),
                validator: Box::new(client),
                narrator,
                clock: Box::new(SystemClock),
            }
        }
        None => Services {
            levels: Box::new(Unconfigured),
            validator: Box::new(Unconfigured),
            narrator: Box::new(SilentNarrator),
            clock: Box::new(SystemClock),
        },
    };

    (services, missing)
}

pub struct JourneyApp {
    settings: GameSettings,
    state: GameState,
    api_key_missing: bool,

    typewriter: Option<Typewriter>,
    portrait: PortraitCache,

    cmd_tx: mpsc::Sender<EngineCommand>,
    resp_rx: mpsc::Receiver<EngineResponse>,
    engine: Option<JoinHandle<()>>,
}

impl JourneyApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: GameSettings) -> Self {
        match install_cjk_font(&cc.egui_ctx, settings.ui.cjk_font_path.as_deref()) {
            Ok(path) => tracing::info!("using font {}", path.display()),
            Err(err) => tracing::warn!("Chinese text may not render: {err:#}"),
        }

        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let (services, api_key_missing) = build_services(&settings);
        let pacing = settings.pacing.clone();

        let engine = std::thread::Builder::new()
            .name("engine".into())
            .spawn(move || {
                let mut engine = Engine::new(cmd_rx, resp_tx, services, pacing);
                engine.run();
            });
        let engine = match engine {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::error!("engine thread failed to start: {err}");
                None
            }
        };

        Self {
            settings,
            state: GameState::new(),
            api_key_missing,
            typewriter: None,
            portrait: PortraitCache::default(),
            cmd_tx,
            resp_rx,
            engine,
        }
    }

    fn send_command(&self, cmd: EngineCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            tracing::error!("engine is gone; command dropped");
        }
    }

    fn apply_state(&mut self, state: GameState) {
        if state.feedback != self.state.feedback {
            self.typewriter = state.feedback.as_ref().map(|text| {
                Typewriter::new(
                    text.clone(),
                    Instant::now(),
                    self.settings.ui.typewriter_chars_per_sec,
                )
            });
        }
        self.state = state;
    }
}

impl eframe::App for JourneyApp {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        ctx.set_zoom_factor(self.settings.ui.ui_scale);

        while let Ok(resp) = self.resp_rx.try_recv() {
            match resp {
                EngineResponse::StateChanged(state) => self.apply_state(state),
            }
        }

        let now = Instant::now();
        let action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .show(ui, |ui| match &self.state.current_level {
                        Some(level) if self.state.phase.has_level() => {
                            let portrait =
                                self.portrait.texture(ctx, level.monster_image.as_ref());
                            screens::draw_battle(
                                ui,
                                &self.state,
                                level,
                                portrait,
                                self.typewriter.as_ref(),
                                now,
                            )
                        }
                        _ => match self.state.phase {
                            Phase::Intro => screens::draw_intro(ui, self.api_key_missing),
                            Phase::Stranded => screens::draw_stranded(ui, &self.state),
                            // a battle phase without its level only shows up mid-transition
                            _ => {
                                screens::draw_loading(ui, &self.state);
                                None
                            }
                        },
                    })
                    .inner
            })
            .inner;

        if let Some(cmd) = action {
            self.send_command(cmd);
        }

        // engine updates arrive over the channel, so keep polling
        ctx.request_repaint_after(Duration::from_millis(50));
    }
}

impl Drop for JourneyApp {
    fn drop(&mut self) {
        save_settings(&self.settings);

        // the engine may be blocked in a service call, so only wait briefly
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
        if let Some(engine) = self.engine.take() {
            join_within(engine, SHUTDOWN_GRACE);
        }
    }
}
