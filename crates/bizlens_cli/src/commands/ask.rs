//! `bizlens ask`: one question, one streamed answer.

use anyhow::{Result, anyhow};
use bizlens_core::TurnStatus;

use super::{TurnReport, business_context, coordinator, timeout};
use crate::cli::{ContextArgs, SessionArgs};
use crate::output;
use crate::render::render_turn;

pub async fn handle(question: String, context: ContextArgs, session: SessionArgs) -> Result<()> {
    let coordinator = coordinator(&session)?;
    let context = business_context(&context);

    let stream = coordinator.send(&question, &context)?;
    let outcome = render_turn(stream, timeout(&session), |_| {}).await;

    if output::is_json() {
        output::data(
            "turn",
            &TurnReport {
                question: &question,
                industry: context.industry,
                outcome: &outcome,
            },
        );
    }

    match &outcome.status {
        TurnStatus::Completed => Ok(()),
        TurnStatus::Failed { error } => Err(anyhow!("analysis failed: {}", error)),
        TurnStatus::Abandoned => Err(anyhow!("no complete answer received")),
    }
}
