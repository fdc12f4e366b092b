pub mod engine;
pub mod error;
pub mod llm_client;
pub mod prompt_builder;
pub mod protocol;
pub mod services;
pub mod timers;
