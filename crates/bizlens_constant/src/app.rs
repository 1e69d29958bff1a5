//! Application metadata constants

pub const NAME: &str = "bizlens";
pub const DISPLAY_NAME: &str = "BizLens";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = "Business insights assistant for the terminal";

/// Directory name for bizlens data, under the home dir or a project
pub const DATA_DIR: &str = ".bizlens";
/// Env file inside DATA_DIR holding saved API keys
pub const ENV_FILE: &str = "env";
