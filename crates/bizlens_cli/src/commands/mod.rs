//! Command dispatch.

pub mod ask;
pub mod chat;
pub mod config;
pub mod info;
pub mod providers;

use std::time::Duration;

use anyhow::Result;
use bizlens_core::{
    BusinessContext, BusinessMetrics, ChatConfig, ChatCoordinator, Industry, TurnOutcome,
};
use serde::Serialize;

use crate::cli::{Cli, Command, ContextArgs, SessionArgs};

pub async fn handle(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Chat { context, session } => chat::handle(context, session).await,
        Command::Ask {
            question,
            context,
            session,
        } => ask::handle(question, context, session).await,
        Command::Industries => info::industries(),
        Command::Samples => info::samples(),
        Command::Providers { action } => providers::handle(action).await,
        Command::Config { action } => config::handle(action).await,
    }
}

/// Env configuration with command-line overrides applied.
fn chat_config(args: &SessionArgs) -> Result<ChatConfig> {
    let mut config = ChatConfig::from_env()?;
    if let Some(provider) = &args.provider {
        config = config.with_provider(provider.parse()?);
    }
    if let Some(model) = &args.model {
        config = config.with_model(model);
    }
    if let Some(temperature) = args.temperature {
        config = config.with_temperature(temperature);
    }
    Ok(config)
}

fn coordinator(args: &SessionArgs) -> Result<ChatCoordinator> {
    let config = chat_config(args)?;
    tracing::debug!(provider = %config.provider, model = %config.model, "chat config");
    Ok(ChatCoordinator::new(
        config.session_config(),
        config.provider_factory(),
    )?)
}

fn business_context(args: &ContextArgs) -> BusinessContext {
    let mut metrics = BusinessMetrics::new();
    if let Some(revenue) = &args.revenue {
        metrics = metrics.with_revenue(revenue);
    }
    if let Some(expenses) = &args.expenses {
        metrics = metrics.with_expenses(expenses);
    }
    if let Some(customers) = &args.customers {
        metrics = metrics.with_customer_count(customers);
    }
    BusinessContext::new(args.industry, metrics)
}

fn timeout(args: &SessionArgs) -> Option<Duration> {
    args.timeout.map(Duration::from_secs)
}

/// Structured record of one answered question.
#[derive(Serialize)]
struct TurnReport<'a> {
    question: &'a str,
    industry: Industry,
    #[serde(flatten)]
    outcome: &'a TurnOutcome,
}
