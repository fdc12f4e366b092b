pub mod settings;
pub mod settings_io;

use std::env;

/// Environment variables checked for the service credential, in order.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

pub fn api_key_from_env() -> Option<String> {
    find_api_key(|var| env::var(var).ok())
}

/// First non-blank value among `API_KEY_VARS`, trimmed.
fn find_api_key(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    API_KEY_VARS
        .iter()
        .filter_map(|var| lookup(*var))
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
}
