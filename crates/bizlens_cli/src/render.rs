//! Drives a [`TurnStream`] to completion on the terminal.

use std::time::Duration;

use bizlens_core::{TurnEvent, TurnOutcome, TurnStatus, TurnStream};
use futures::StreamExt;
use tokio::time::Instant;

use crate::output::{self, StreamPrinter};

/// Print a reply as it streams in and return how the turn ended.
///
/// Ctrl-C or an elapsed `timeout` drops the stream, which ends the turn as
/// abandoned with whatever text arrived. `on_text` sees every cumulative
/// increment.
pub async fn render_turn<F>(
    mut stream: TurnStream,
    timeout: Option<Duration>,
    mut on_text: F,
) -> TurnOutcome
where
    F: FnMut(&str),
{
    let spinner = output::spinner("Analyzing...");
    let mut printer = StreamPrinter::new();
    let mut waiting = true;

    let deadline = timeout.map(|t| Instant::now() + t);
    let expired = async move {
        match deadline {
            Some(at) => tokio::time::sleep_until(at).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(expired);
    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    let (outcome, stopped) = loop {
        tokio::select! {
            event = stream.next() => match event {
                Some(TurnEvent::Increment(text)) => {
                    if waiting {
                        spinner.finish_and_clear();
                        waiting = false;
                    }
                    printer.update(&text);
                    on_text(&text);
                }
                Some(TurnEvent::Completed(outcome)) => break (outcome, None),
                None => break (abandoned(&printer), None),
            },
            _ = &mut interrupted => break (abandoned(&printer), Some("interrupted")),
            _ = &mut expired => break (abandoned(&printer), Some("timed out waiting for a reply")),
        }
    };
    drop(stream);

    spinner.finish_and_clear();
    printer.finish();
    if let Some(reason) = stopped {
        output::warning(reason);
    }
    if let TurnStatus::Failed { error } = &outcome.status {
        tracing::debug!(%error, "turn failed");
    }
    outcome
}

fn abandoned(printer: &StreamPrinter) -> TurnOutcome {
    TurnOutcome {
        text: printer.shown().to_string(),
        status: TurnStatus::Abandoned,
        usage: None,
    }
}
