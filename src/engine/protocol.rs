use crate::model::game_state::GameState;

pub enum EngineCommand {
    StartGame,
    SubmitChoice(String),
    NextLevel,
    Restart,
    StopNarration,
    Shutdown,
}

pub enum EngineResponse {
    StateChanged(GameState),
}
