//! CLI entry point for bizlens.

mod cli;
mod commands;
mod output;
mod render;
mod repl;

use std::path::{Path, PathBuf};

use bizlens_constant::app;
use bizlens_observability::ObservabilityConfig;
use clap::Parser;

use crate::cli::Cli;

/// Nearest `relative` file walking up from the current directory.
fn find_upwards(relative: &Path) -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    for _ in 0..32 {
        let candidate = dir.join(relative);
        if candidate.exists() {
            return Some(candidate);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Load env files. Variables already set win, and earlier files win over
/// later ones: 1) ~/.bizlens/env  2) .bizlens/env (project)  3) .env
fn load_bizlens_env() {
    if let Some(home) = dirs::home_dir() {
        let global = home.join(app::DATA_DIR).join(app::ENV_FILE);
        if global.exists() {
            let _ = dotenvy::from_path(&global);
        }
    }
    if let Some(project) = find_upwards(&Path::new(app::DATA_DIR).join(app::ENV_FILE)) {
        let _ = dotenvy::from_path(&project);
    }
    if let Some(dotenv) = find_upwards(Path::new(".env")) {
        let _ = dotenvy::from_path(&dotenv);
    }
}

fn init_logging(verbose: bool) {
    let mut config = ObservabilityConfig::from_env().with_version(app::VERSION);
    if verbose {
        config = config.with_log_level("debug");
    }
    if let Err(e) = bizlens_observability::init(config) {
        output::warning(&format!("logging disabled: {}", e));
    }
}

#[tokio::main]
async fn main() {
    load_bizlens_env();
    let cli = Cli::parse();
    output::init(cli.output);
    init_logging(cli.verbose);

    let result = commands::handle(cli).await;
    bizlens_observability::shutdown();

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
