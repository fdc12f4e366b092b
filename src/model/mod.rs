pub mod game_state;
pub mod level;
pub mod llm_decode;
pub mod validation;
