pub mod app;
pub mod fonts;
pub mod portrait;
pub mod screens;
pub mod typewriter;
