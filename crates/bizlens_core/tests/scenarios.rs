//! End-to-end prompt composition through the coordinator.

mod common;

use bizlens_core::{BusinessContext, BusinessMetrics, Industry};
use common::{Script, ScriptedProvider};

#[tokio::test]
async fn empty_metrics_render_not_provided() -> anyhow::Result<()> {
    let provider = ScriptedProvider::new();
    let coord = common::coordinator(&provider);
    let ctx = BusinessContext::new(Industry::Retail, BusinessMetrics::default());

    coord
        .send_with("Why are my sales decreasing?", &ctx, |_| {})
        .await?;

    let prompt = provider.prompt(0);
    assert!(prompt.contains("Industry: Retail\n"));
    assert!(prompt.contains("Revenue/Sales: Not provided\n"));
    assert!(prompt.contains("Expenses/Costs: Not provided\n"));
    assert!(prompt.contains("Customer Count: Not provided\n"));
    assert!(prompt.ends_with("User Query: Why are my sales decreasing?"));
    Ok(())
}

#[tokio::test]
async fn provided_metrics_are_embedded_literally() -> anyhow::Result<()> {
    let provider = ScriptedProvider::new();
    let coord = common::coordinator(&provider);
    let ctx = BusinessContext::new(
        Industry::ECommerce,
        BusinessMetrics::new()
            .with_revenue("50000")
            .with_expenses("30000")
            .with_customer_count("1500"),
    );

    coord
        .send_with("Analyze my current revenue vs expenses.", &ctx, |_| {})
        .await?;

    let prompt = provider.prompt(0);
    assert!(prompt.contains("Industry: E-commerce\n"));
    assert!(prompt.contains("Revenue/Sales: 50000\n"));
    assert!(prompt.contains("Expenses/Costs: 30000\n"));
    assert!(prompt.contains("Customer Count: 1500\n"));
    assert!(!prompt.contains("Not provided"));
    Ok(())
}

#[tokio::test]
async fn second_turn_reflects_updated_metrics() -> anyhow::Result<()> {
    let provider = ScriptedProvider::new();
    provider.push(Script::Fragments(vec!["Noted."]));
    provider.push(Script::Fragments(vec!["Updated."]));
    let coord = common::coordinator(&provider);

    let mut ctx = BusinessContext::default();
    coord.send_with("Here are my numbers.", &ctx, |_| {}).await?;

    ctx.metrics = ctx.metrics.clone().with_revenue("75000");
    ctx.industry = Industry::FoodBeverage;
    coord.send_with("And now?", &ctx, |_| {}).await?;

    let first = provider.prompt(0);
    let second = provider.prompt(1);
    assert!(first.contains("Revenue/Sales: Not provided"));
    assert!(second.contains("Revenue/Sales: 75000"));
    assert!(second.contains("Industry: Food & Beverage"));

    // The earlier prompt is replayed from history unchanged.
    let history = &provider.requests()[1].messages;
    assert_eq!(history[1].content, first);
    Ok(())
}

#[tokio::test]
async fn system_instruction_leads_every_request() -> anyhow::Result<()> {
    let provider = ScriptedProvider::new();
    let coord = common::coordinator(&provider);
    coord
        .send_with("hi", &BusinessContext::default(), |_| {})
        .await?;

    let request = &provider.requests()[0];
    assert!(
        request.messages[0]
            .content
            .starts_with("You are an expert Senior Business Analyst")
    );
    assert_eq!(request.options.temperature, Some(0.7));
    assert_eq!(request.model, "gemini-3-flash-preview");
    Ok(())
}
