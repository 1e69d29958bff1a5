//! `bizlens config` subcommands.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use bizlens_constant::app;
use bizlens_core::ProviderKind;

use crate::cli::ConfigAction;
use crate::output;

pub async fn handle(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Api { provider } => configure_api(provider),
    }
}

fn configure_api(provider: Option<String>) -> Result<()> {
    let kind = match provider {
        Some(p) => p.parse::<ProviderKind>()?,
        None => select_provider()?,
    };
    let env_var = kind.api_key_env();

    output::header(&format!("Configure {}", kind.display_name()));
    if let Ok(current) = env::var(env_var) {
        output::kv("Current:", &mask_key(&current));
    }
    println!();

    let key = prompt_api_key(kind.as_str())?;
    let key = key.trim();
    if key.is_empty() {
        output::warning("No key entered, cancelled.");
        return Ok(());
    }

    let config_path = get_config_path()?;
    save_api_key(&config_path, env_var, key)?;

    output::success(&format!("Saved {} to {}", env_var, config_path.display()));
    output::dim("bizlens reads this file on startup.");

    Ok(())
}

fn select_provider() -> Result<ProviderKind> {
    println!("Select a provider to configure:\n");

    for (i, kind) in ProviderKind::ALL.iter().enumerate() {
        let status = if env::var(kind.api_key_env()).is_ok() {
            console::style("(configured)").green()
        } else {
            console::style("(not set)").dim()
        };
        println!("  {}) {} {} - {}", i + 1, kind, status, kind.display_name());
    }
    println!();

    print!("Enter choice [1-{}]: ", ProviderKind::ALL.len());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let choice: usize = input.trim().parse().map_err(|_| anyhow!("Invalid choice"))?;
    ProviderKind::ALL
        .get(choice.wrapping_sub(1))
        .copied()
        .ok_or_else(|| anyhow!("Choice must be 1-{}", ProviderKind::ALL.len()))
}

fn prompt_api_key(provider: &str) -> Result<String> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
        terminal,
    };

    println!("Enter API key for {}:", provider);
    print!("> ");
    io::stdout().flush()?;

    let mut key = String::new();

    terminal::enable_raw_mode()?;
    let result = (|| -> Result<bool> {
        loop {
            if !event::poll(std::time::Duration::from_millis(100))? {
                continue;
            }
            let Event::Key(k) = event::read()? else {
                continue;
            };
            if k.kind != KeyEventKind::Press {
                continue;
            }
            match k.code {
                KeyCode::Enter => return Ok(true),
                KeyCode::Esc => return Ok(false),
                KeyCode::Backspace => {
                    if key.pop().is_some() {
                        print!("\x08 \x08");
                        io::stdout().flush()?;
                    }
                }
                KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(false);
                }
                KeyCode::Char(c) => {
                    key.push(c);
                    print!("*");
                    io::stdout().flush()?;
                }
                _ => {}
            }
        }
    })();
    terminal::disable_raw_mode()?;
    println!();

    match result? {
        true => Ok(key),
        false => Ok(String::new()),
    }
}

/// First and last four characters; short keys are fully masked.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

fn get_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
    let dir = home.join(app::DATA_DIR);
    fs::create_dir_all(&dir)?;
    Ok(dir.join(app::ENV_FILE))
}

/// Rewrite the env file with `env_var` set, keeping other exported keys.
fn save_api_key(path: &Path, env_var: &str, key: &str) -> Result<()> {
    let existing = if path.exists() {
        fs::read_to_string(path)?
    } else {
        String::new()
    };
    fs::write(path, render_env_file(&existing, env_var, key))?;
    Ok(())
}

fn render_env_file(existing: &str, env_var: &str, key: &str) -> String {
    let mut config: BTreeMap<String, String> = existing
        .lines()
        .filter_map(|line| {
            let line = line.trim().strip_prefix("export ")?;
            let (key, value) = line.split_once('=')?;
            Some((key.trim().to_string(), value.trim().to_string()))
        })
        .collect();

    config.insert(env_var.to_string(), format!("\"{}\"", key));

    let mut content = String::new();
    content.push_str(&format!("# {} configuration\n", app::DISPLAY_NAME));
    content.push_str(&format!("# Source this file: source ~/{}/{}\n\n", app::DATA_DIR, app::ENV_FILE));
    for (k, v) in &config {
        content.push_str(&format!("export {}={}\n", k, v));
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("short"), "*****");
        assert_eq!(mask_key("AIzaSyD-abcdef-1234"), "AIza...1234");
    }

    #[test]
    fn test_env_file_keeps_other_keys_sorted() {
        let existing = "# header\nexport OPENAI_API_KEY=\"sk-old\"\nexport BIZLENS_MODEL=\"m\"\n";
        let out = render_env_file(existing, "GEMINI_API_KEY", "g-new");
        let exports: Vec<_> = out.lines().filter(|l| l.starts_with("export ")).collect();
        assert_eq!(
            exports,
            vec![
                "export BIZLENS_MODEL=\"m\"",
                "export GEMINI_API_KEY=\"g-new\"",
                "export OPENAI_API_KEY=\"sk-old\"",
            ]
        );
    }

    #[test]
    fn test_env_file_replaces_existing_key() {
        let existing = "export GEMINI_API_KEY=\"old\"\n";
        let out = render_env_file(existing, "GEMINI_API_KEY", "new");
        assert!(out.contains("export GEMINI_API_KEY=\"new\""));
        assert!(!out.contains("old"));
    }
}
