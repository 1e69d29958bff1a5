//! `bizlens chat`: interactive analysis session.

use anyhow::Result;
use bizlens_constant::prompt::SAMPLE_QUESTIONS;
use bizlens_core::{BusinessContext, ChatCoordinator, Transcript, TurnStatus, or_not_provided};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{TurnReport, business_context, coordinator, timeout};
use crate::cli::{ContextArgs, SessionArgs};
use crate::output;
use crate::render::render_turn;
use crate::repl::{self, Command, HELP, Input};

pub async fn handle(context: ContextArgs, session: SessionArgs) -> Result<()> {
    let coordinator = coordinator(&session)?;
    let mut context = business_context(&context);
    let mut transcript = Transcript::with_greeting();
    let timeout = timeout(&session);

    if let Some(greeting) = transcript.last() {
        output::assistant(&greeting.text);
    }
    show_context(&context);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        output::prompt("you ›");
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };

        let question = match repl::parse(&line) {
            Ok(Input::Empty) => continue,
            Ok(Input::Message(text)) => text,
            Ok(Input::Command(Command::Sample(index))) => {
                let question = SAMPLE_QUESTIONS[index].to_string();
                output::dim(&format!("› {}", question));
                question
            }
            Ok(Input::Command(Command::Quit)) => break,
            Ok(Input::Command(command)) => {
                apply(command, &coordinator, &mut context, &mut transcript);
                continue;
            }
            Err(message) => {
                output::warning(&message);
                continue;
            }
        };

        let stream = match coordinator.send(&question, &context) {
            Ok(stream) => stream,
            Err(e) => {
                output::error(&e.to_string());
                continue;
            }
        };

        transcript.push_user(question.as_str());
        let reply = transcript.begin_model();
        let outcome = render_turn(stream, timeout, |text| {
            transcript.update_streaming(&reply, text);
        })
        .await;
        transcript.finish(&reply, outcome.text.as_str());

        if output::is_json() {
            output::data(
                "turn",
                &TurnReport {
                    question: &question,
                    industry: context.industry,
                    outcome: &outcome,
                },
            );
        } else if let TurnStatus::Failed { error } = &outcome.status {
            output::dim(error);
        }
    }

    tracing::debug!(
        messages = transcript.len(),
        turns = coordinator.turn_count(),
        "chat ended"
    );
    Ok(())
}

/// Handle a command that does not ask the analyst anything.
fn apply(
    command: Command,
    coordinator: &ChatCoordinator,
    context: &mut BusinessContext,
    transcript: &mut Transcript,
) {
    match command {
        Command::Industry(industry) => {
            context.industry = industry;
            output::success(&format!("Industry set to {}", industry));
        }
        Command::Revenue(value) => {
            context.metrics.revenue = value;
            output::success(&format!(
                "Revenue/Sales: {}",
                or_not_provided(&context.metrics.revenue)
            ));
        }
        Command::Expenses(value) => {
            context.metrics.expenses = value;
            output::success(&format!(
                "Expenses/Costs: {}",
                or_not_provided(&context.metrics.expenses)
            ));
        }
        Command::Customers(value) => {
            context.metrics.customer_count = value;
            output::success(&format!(
                "Customer Count: {}",
                or_not_provided(&context.metrics.customer_count)
            ));
        }
        Command::Metrics => show_context(context),
        Command::Samples => show_samples(),
        Command::Clear => {
            if let Err(e) = coordinator.reset() {
                output::error(&format!("{} (will retry on the next question)", e));
            }
            transcript.clear();
            if let Some(greeting) = transcript.last() {
                output::assistant(&greeting.text);
            }
        }
        Command::Help => println!("{}", HELP),
        // Handled by the input loop.
        Command::Sample(_) | Command::Quit => {}
    }
}

fn show_context(context: &BusinessContext) {
    output::header("Business context");
    output::kv("Industry:", context.industry.as_str());
    output::kv("Revenue/Sales:", or_not_provided(&context.metrics.revenue));
    output::kv("Expenses/Costs:", or_not_provided(&context.metrics.expenses));
    output::kv("Customer Count:", or_not_provided(&context.metrics.customer_count));
}

fn show_samples() {
    output::header("Sample questions");
    for (i, question) in SAMPLE_QUESTIONS.iter().enumerate() {
        output::kv(&format!("{}.", i + 1), question);
    }
    output::dim("Ask one with /sample <n>");
}
