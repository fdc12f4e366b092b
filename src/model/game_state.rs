use crate::model::level::LevelData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Intro,
    Loading,
    Playing,
    Resolving,
    Success,
    GameOver,
    /// The final tribulation was cleared.
    Victory,
    /// Level generation gave up after exhausting its retry budget.
    Stranded,
}

impl Phase {
    /// Phases in which a level payload must be present.
    pub fn has_level(self) -> bool {
        !matches!(self, Phase::Intro | Phase::Loading | Phase::Stranded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerPose {
    #[default]
    Idle,
    Attack,
    Hit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnemyPose {
    #[default]
    Idle,
    Attack,
    Hit,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BattlePose {
    pub player: PlayerPose,
    pub enemy: EnemyPose,
}

/// Everything the screens need to render one frame.
/// Owned by the engine; the UI only ever sees clones.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub phase: Phase,
    pub level_number: u32,
    pub score: u32,
    pub current_level: Option<LevelData>,
    pub feedback: Option<String>,

    /// Enemies defeated so far, oldest first
    pub history: Vec<String>,

    /// Loading / reconnecting message
    pub status_line: String,

    /// Transient, retryable problem shown on the battle screen
    pub notice: Option<String>,

    pub pose: BattlePose,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Intro,
            level_number: 1,
            score: 0,
            current_level: None,
            feedback: None,
            history: Vec::new(),
            status_line: String::new(),
            notice: None,
            pose: BattlePose::default(),
        }
    }

    pub fn enemy_name(&self) -> Option<&str> {
        self.current_level.as_ref().map(|l| l.enemy_name.as_str())
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_starts_at_intro() {
        let state = GameState::new();
        assert_eq!(state.phase, Phase::Intro);
        assert_eq!(state.level_number, 1);
        assert_eq!(state.score, 0);
        assert!(state.history.is_empty());
        assert!(state.current_level.is_none());
    }

    #[test]
    fn only_waiting_phases_lack_a_level() {
        assert!(!Phase::Intro.has_level());
        assert!(!Phase::Loading.has_level());
        assert!(!Phase::Stranded.has_level());
        assert!(Phase::Playing.has_level());
        assert!(Phase::Resolving.has_level());
        assert!(Phase::Success.has_level());
        assert!(Phase::GameOver.has_level());
        assert!(Phase::Victory.has_level());
    }
}
