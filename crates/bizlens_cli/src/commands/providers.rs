//! `bizlens providers` subcommands.

use std::sync::Arc;

use anyhow::{Result, anyhow};
use bizlens_core::{ProviderKind, create_provider};
use bizlens_llms::{Provider, ProviderRegistry};
use bizlens_observability::{provider_span, record_error};
use serde::Serialize;
use tracing::Instrument;

use crate::cli::ProvidersAction;
use crate::output;

#[derive(Serialize)]
struct ProviderInfo {
    id: &'static str,
    name: &'static str,
    has_key: bool,
    default_model: &'static str,
}

fn build_registry() -> (ProviderRegistry, Vec<ProviderInfo>) {
    let mut registry = ProviderRegistry::new();
    let mut infos = Vec::new();

    for kind in ProviderKind::ALL {
        let has_key = match create_provider(kind) {
            Ok(provider) => {
                registry = registry.register_shared(kind.as_str(), provider);
                true
            }
            Err(e) => {
                tracing::debug!(provider = kind.as_str(), error = %e, "provider unavailable");
                false
            }
        };
        infos.push(ProviderInfo {
            id: kind.as_str(),
            name: kind.display_name(),
            has_key,
            default_model: kind.default_model(),
        });
    }

    (registry, infos)
}

pub async fn handle(action: ProvidersAction) -> Result<()> {
    match action {
        ProvidersAction::List => list(),
        ProvidersAction::Models { id } => models(&id).await,
        ProvidersAction::Test { id } => test(&id).await,
    }
}

fn list() -> Result<()> {
    let (_, infos) = build_registry();

    output::header("Providers");

    let mut table = output::table();
    output::table_header(&mut table, &["Provider", "Name", "Status", "Default model"]);
    for info in &infos {
        let status = if info.has_key {
            "configured"
        } else {
            "missing API key"
        };
        output::table_row(&mut table, &[info.id, info.name, status, info.default_model]);
    }

    output::table_print(&table, &infos);
    Ok(())
}

/// Resolve `id` to a configured provider, with a hint when the key is missing.
fn lookup(id: &str) -> Result<(ProviderKind, Arc<dyn Provider>)> {
    let kind: ProviderKind = id.parse()?;
    let (registry, _) = build_registry();
    let provider = registry.get_provider(kind.as_str()).map_err(|_| {
        anyhow!(
            "{} is not configured: set {} or run 'bizlens config api --provider {}'",
            kind.display_name(),
            kind.api_key_env(),
            kind.as_str()
        )
    })?;
    Ok((kind, provider))
}

async fn fetch_models(
    kind: ProviderKind,
    provider: &dyn Provider,
) -> bizlens_llms::Result<Vec<String>> {
    let span = provider_span!(kind, kind.default_model());
    let result = provider.list_models().instrument(span.clone()).await;
    if let Err(e) = &result {
        span.in_scope(|| record_error(e));
    }
    result
}

async fn test(id: &str) -> Result<()> {
    let (kind, provider) = lookup(id)?;

    let spinner = output::spinner(&format!("Testing {} connectivity...", id));

    match fetch_models(kind, provider.as_ref()).await {
        Ok(models) => {
            output::spinner_success(
                &spinner,
                &format!("{} is reachable ({} models)", id, models.len()),
            );
            Ok(())
        }
        Err(e) => {
            output::spinner_error(&spinner, &format!("{} connection failed", id));
            Err(anyhow!("Provider test failed: {}", e))
        }
    }
}

async fn models(id: &str) -> Result<()> {
    let (kind, provider) = lookup(id)?;

    let spinner = output::spinner(&format!("Fetching models for {}...", id));

    match fetch_models(kind, provider.as_ref()).await {
        Ok(models) => {
            spinner.finish_and_clear();

            output::header(&format!("Models for {}", id));

            if models.is_empty() {
                output::dim("No models returned");
                return Ok(());
            }

            let mut table = output::table();
            output::table_header(&mut table, &["Model"]);
            for model in &models {
                output::table_row(&mut table, &[model.as_str()]);
            }

            output::table_print(&table, &models);
            Ok(())
        }
        Err(e) => {
            output::spinner_error(&spinner, "Failed to fetch models");
            Err(anyhow!("Failed to list models: {}", e))
        }
    }
}
