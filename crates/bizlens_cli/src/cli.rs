//! CLI argument definitions using clap derive macros.

use bizlens_core::Industry;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Business insights assistant: ask an AI analyst about your numbers
#[derive(Parser)]
#[command(name = "bizlens", about, version, propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format: text (human-readable) or json (machine-readable)
    #[arg(short, long, global = true, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// Colored terminal output for humans
    #[default]
    Text,
    /// Structured JSON for scripts
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start an interactive analysis session
    Chat {
        #[command(flatten)]
        context: ContextArgs,
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Ask a single question and print the answer
    Ask {
        /// The question for the analyst
        question: String,
        #[command(flatten)]
        context: ContextArgs,
        #[command(flatten)]
        session: SessionArgs,
    },
    /// List the supported industries
    Industries,
    /// List the sample questions
    Samples,
    /// Inspect and test LLM providers
    Providers {
        #[command(subcommand)]
        action: ProvidersAction,
    },
    /// Configure bizlens settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Business context sent with every question.
#[derive(Args, Clone, Debug)]
pub struct ContextArgs {
    /// Industry sector (e.g. retail, "F&B", saas)
    #[arg(long, default_value_t = Industry::default())]
    pub industry: Industry,
    /// Revenue or sales figure, free text (e.g. "$120k/month")
    #[arg(long)]
    pub revenue: Option<String>,
    /// Expenses or costs, free text
    #[arg(long)]
    pub expenses: Option<String>,
    /// Customer count, free text
    #[arg(long)]
    pub customers: Option<String>,
}

/// Backend overrides. Unset values fall back to BIZLENS_* env vars.
#[derive(Args, Clone, Debug, Default)]
pub struct SessionArgs {
    /// Provider to use (gemini, openai). Uses BIZLENS_PROVIDER if not set.
    #[arg(long)]
    pub provider: Option<String>,
    /// Model to use. Uses BIZLENS_MODEL if not set.
    #[arg(long)]
    pub model: Option<String>,
    /// Sampling temperature between 0 and 1
    #[arg(long)]
    pub temperature: Option<f32>,
    /// Give up on a reply after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

#[derive(Subcommand)]
pub enum ProvidersAction {
    /// List providers and whether an API key is configured
    List,
    /// List the models a provider offers
    Models {
        /// Provider ID (gemini, openai)
        id: String,
    },
    /// Check connectivity to a provider
    Test {
        /// Provider ID (gemini, openai)
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Configure API key for a provider (interactive)
    Api {
        /// Provider ID (skip the selection prompt)
        #[arg(long)]
        provider: Option<String>,
    },
}
