use std::time::Instant;

use eframe::egui;
use egui::{Color32, RichText};

use crate::engine::protocol::EngineCommand;
use crate::model::game_state::{EnemyPose, GameState, Phase, PlayerPose};
use crate::model::level::{Choice, LevelData, FINAL_LEVEL};
use crate::ui::typewriter::Typewriter;

const CRIMSON: Color32 = Color32::from_rgb(139, 26, 26);
const GOLD: Color32 = Color32::from_rgb(184, 134, 11);
const PARCHMENT: Color32 = Color32::from_rgb(245, 235, 210);
const INK: Color32 = Color32::from_rgb(60, 45, 30);

/* =========================
   Intro / loading
   ========================= */

pub fn draw_intro(ui: &mut egui::Ui, api_key_missing: bool) -> Option<EngineCommand> {
    let mut action = None;

    ui.vertical_centered(|ui| {
        ui.add_space(60.0);
        ui.label(RichText::new("西游·法宝大师").size(48.0).color(CRIMSON).strong());
        ui.label(RichText::new("取经路上的劫难与智慧").size(22.0).italics().color(INK));
        ui.add_space(24.0);

        parchment(ui, CRIMSON, |ui| {
            ui.label(RichText::new("贫僧有礼了。西天取经之路，妖魔横行，劫难重重。").size(17.0));
            ui.add_space(8.0);
            ui.label(
                RichText::new("光靠金箍棒未必能降妖除魔。你需熟读原著，针对每一难，选用正确的法宝方能化险为夷。")
                    .size(17.0),
            );
            ui.add_space(16.0);

            let start = egui::Button::new(RichText::new("踏上征途").size(26.0).color(PARCHMENT))
                .fill(CRIMSON)
                .min_size(egui::vec2(220.0, 56.0));
            if ui.add(start).clicked() {
                action = Some(EngineCommand::StartGame);
            }
        });

        ui.add_space(12.0);
        if api_key_missing {
            ui.colored_label(CRIMSON, "未设置 GEMINI_API_KEY，无法向天庭请旨。");
        }
        ui.label(RichText::new("请开启声音以获得最佳体验").small().weak());
    });

    action
}

pub fn draw_loading(ui: &mut egui::Ui, state: &GameState) {
    ui.vertical_centered(|ui| {
        ui.add_space(160.0);
        ui.add(egui::Spinner::new().size(64.0).color(INK));
        ui.add_space(24.0);
        ui.label(RichText::new(&state.status_line).size(26.0).color(INK));
    });
}

pub fn draw_stranded(ui: &mut egui::Ui, state: &GameState) -> Option<EngineCommand> {
    let mut action = None;
    ui.vertical_centered(|ui| {
        ui.add_space(160.0);
        ui.label(RichText::new("☁").size(64.0));
        ui.label(RichText::new(&state.status_line).size(24.0).color(CRIMSON));
        ui.add_space(16.0);
        if ui.button(RichText::new("重新来过").size(20.0)).clicked() {
            action = Some(EngineCommand::Restart);
        }
    });
    action
}

/* =========================
   Battle
   ========================= */

pub fn draw_battle(
    ui: &mut egui::Ui,
    state: &GameState,
    level: &LevelData,
    portrait: Option<&egui::TextureHandle>,
    typewriter: Option<&Typewriter>,
    now: Instant,
) -> Option<EngineCommand> {
    let mut action = None;

    ui.horizontal(|ui| {
        ui.vertical(|ui| {
            let heading = if state.level_number == FINAL_LEVEL {
                "最后一难".to_string()
            } else {
                format!("第 {} 难", state.level_number)
            };
            ui.label(RichText::new(heading).size(30.0).color(CRIMSON).strong());
            ui.label(RichText::new(format!("功德值: {}", state.score)).italics().color(INK));
        });

        ui.with_layout(egui::Layout::right_to_left(egui::Align::TOP), |ui| {
            if ui.button("🔇 静音/停止").on_hover_text("停止朗读").clicked() {
                action = Some(EngineCommand::StopNarration);
            }
            ui.add_space(16.0);
            ui.vertical(|ui| {
                ui.label(RichText::new("当前地界").small().weak());
                ui.label(RichText::new(format!("第{}回", level.chapter)).strong());
            });
        });
    });
    ui.separator();

    draw_scene(ui, state, level, portrait);
    ui.add_space(12.0);

    parchment(ui, INK, |ui| {
        ui.label(RichText::new(&level.title).size(22.0).color(CRIMSON).strong());
        ui.add_space(6.0);
        match typewriter {
            Some(tw) => {
                let mut shown = tw.visible(now).to_string();
                if !tw.is_done(now) {
                    shown.push('▌');
                }
                ui.label(RichText::new(shown).size(17.0).italics());
            }
            None => {
                ui.label(RichText::new(&level.story).size(17.0));
            }
        }
        if let Some(notice) = &state.notice {
            ui.add_space(6.0);
            ui.colored_label(CRIMSON, notice.as_str());
        }
    });
    ui.add_space(12.0);

    match state.phase {
        Phase::Playing | Phase::Resolving => {
            let enabled = state.phase == Phase::Playing;
            if let Some(name) = draw_choices(ui, &level.choices, enabled) {
                action = Some(EngineCommand::SubmitChoice(name));
            }
        }
        Phase::Success => {
            let cmd = draw_outcome(
                ui,
                GOLD,
                "善哉善哉！",
                "施主好眼力，此难已过。",
                "继续西行 →",
                EngineCommand::NextLevel,
            );
            action = action.or(cmd);
        }
        Phase::GameOver => {
            let cmd = draw_outcome(
                ui,
                CRIMSON,
                "胜败乃兵家常事",
                "可惜选错了法宝，已被妖怪拿去...",
                "重新来过",
                EngineCommand::Restart,
            );
            action = action.or(cmd);
        }
        Phase::Victory => {
            let cmd = draw_outcome(
                ui,
                GOLD,
                "功德圆满",
                "九九八十一难历尽，真经已得。",
                "重新来过",
                EngineCommand::Restart,
            );
            action = action.or(cmd);
        }
        Phase::Intro | Phase::Loading | Phase::Stranded => {}
    }

    action
}

fn draw_scene(
    ui: &mut egui::Ui,
    state: &GameState,
    level: &LevelData,
    portrait: Option<&egui::TextureHandle>,
) {
    let player_glyph = match state.pose.player {
        PlayerPose::Idle => "🐒",
        PlayerPose::Attack => "🐒⚡",
        PlayerPose::Hit => "🐒💫",
    };
    let (enemy_tint, enemy_mark) = match state.pose.enemy {
        EnemyPose::Idle => (Color32::WHITE, ""),
        EnemyPose::Attack => (Color32::from_rgb(255, 200, 200), "🔥"),
        EnemyPose::Hit => (Color32::from_rgb(255, 160, 160), "💥"),
        EnemyPose::Dead => (Color32::from_gray(90), "💀"),
    };

    ui.horizontal(|ui| {
        ui.vertical(|ui| {
            ui.add_space(80.0);
            ui.label(RichText::new(player_glyph).size(56.0));
            ui.label(RichText::new("齐天大圣").color(INK));
        });

        ui.add_space(40.0);

        ui.vertical(|ui| {
            let size = egui::vec2(220.0, 220.0);
            match portrait {
                Some(texture) => {
                    ui.add(
                        egui::Image::new(texture)
                            .fit_to_exact_size(size)
                            .tint(enemy_tint)
                            .corner_radius(8),
                    );
                }
                None => {
                    egui::Frame::new()
                        .fill(INK)
                        .corner_radius(8)
                        .show(ui, |ui| {
                            ui.set_min_size(size);
                            ui.centered_and_justified(|ui| {
                                ui.label(
                                    RichText::new("妖").size(96.0).color(enemy_tint),
                                );
                            });
                        });
                }
            }
            ui.horizontal(|ui| {
                ui.label(RichText::new(&level.enemy_name).size(20.0).strong());
                ui.label(RichText::new(enemy_mark).size(20.0));
            });
        });
    });
}

fn draw_choices(ui: &mut egui::Ui, choices: &[Choice], enabled: bool) -> Option<String> {
    let mut picked = None;
    let width = ((ui.available_width() - 36.0) / choices.len().max(1) as f32).max(120.0);

    ui.horizontal(|ui| {
        for choice in choices {
            let text = RichText::new(format!(
                "{}\n{}\n{}",
                choice.icon, choice.name, choice.description
            ))
            .size(16.0);
            let card = egui::Button::new(text)
                .wrap()
                .fill(PARCHMENT)
                .min_size(egui::vec2(width, 120.0));

            if ui.add_enabled(enabled, card).clicked() {
                picked = Some(choice.name.clone());
            }
        }
    });

    picked
}

fn draw_outcome(
    ui: &mut egui::Ui,
    accent: Color32,
    title: &str,
    line: &str,
    button: &str,
    command: EngineCommand,
) -> Option<EngineCommand> {
    let mut action = None;
    ui.vertical_centered(|ui| {
        parchment(ui, accent, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(RichText::new(title).size(34.0).color(accent).strong());
                ui.label(RichText::new(line).color(INK));
                ui.add_space(12.0);
                let btn = egui::Button::new(RichText::new(button).size(20.0).color(PARCHMENT))
                    .fill(accent)
                    .min_size(egui::vec2(180.0, 44.0));
                if ui.add(btn).clicked() {
                    action = Some(command);
                }
            });
        });
    });
    action
}

/* =========================
   UI Helpers
   ========================= */

fn parchment(ui: &mut egui::Ui, border: Color32, add_contents: impl FnOnce(&mut egui::Ui)) {
    egui::Frame::new()
        .fill(PARCHMENT)
        .stroke(egui::Stroke::new(2.0, border))
        .corner_radius(8)
        .inner_margin(egui::Margin::same(16))
        .show(ui, |ui| {
            ui.visuals_mut().override_text_color = Some(INK);
            add_contents(ui);
        });
}
