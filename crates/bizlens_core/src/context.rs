//! Conversation context builder
//!
//! Every user turn is sent as a business-context block followed by the raw
//! query, so the model always sees the latest industry and metrics without
//! the session being recreated.

use serde::{Deserialize, Serialize};

use crate::metrics::{BusinessMetrics, Industry};

/// Rendered in place of any metric left empty.
pub const NOT_PROVIDED: &str = "Not provided";

pub const CONTEXT_HEADER: &str = "[CURRENT BUSINESS CONTEXT]";

pub const CONTEXT_DIVIDER: &str = "---------------------------------------------------";

/// Industry and metrics snapshot taken at send time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessContext {
    pub industry: Industry,
    #[serde(default)]
    pub metrics: BusinessMetrics,
}

impl BusinessContext {
    pub fn new(industry: Industry, metrics: BusinessMetrics) -> Self {
        Self { industry, metrics }
    }

    pub fn with_industry(mut self, industry: Industry) -> Self {
        self.industry = industry;
        self
    }

    pub fn with_metrics(mut self, metrics: BusinessMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn context_block(&self) -> String {
        build_context_block(self.industry, &self.metrics)
    }

    pub fn compose_prompt(&self, user_message: &str) -> String {
        compose_prompt(self, user_message)
    }
}

/// Display form of a metric: only an empty field reads as unset.
pub fn or_not_provided(value: &str) -> &str {
    if value.is_empty() {
        NOT_PROVIDED
    } else {
        value
    }
}

/// Render the context block. All three metric lines are always present, in
/// fixed order.
pub fn build_context_block(industry: Industry, metrics: &BusinessMetrics) -> String {
    format!(
        "\n{header}\nIndustry: {industry}\nRevenue/Sales: {revenue}\nExpenses/Costs: {expenses}\nCustomer Count: {customers}\n{divider}\n",
        header = CONTEXT_HEADER,
        industry = industry,
        revenue = or_not_provided(&metrics.revenue),
        expenses = or_not_provided(&metrics.expenses),
        customers = or_not_provided(&metrics.customer_count),
        divider = CONTEXT_DIVIDER,
    )
}

/// Full prompt for one turn. The user message is embedded verbatim.
pub fn compose_prompt(context: &BusinessContext, user_message: &str) -> String {
    format!("{}\nUser Query: {}", context.context_block(), user_message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_metrics_render_not_provided() {
        let block = build_context_block(Industry::Retail, &BusinessMetrics::default());
        assert_eq!(
            block,
            "\n[CURRENT BUSINESS CONTEXT]\nIndustry: Retail\nRevenue/Sales: Not provided\n\
             Expenses/Costs: Not provided\nCustomer Count: Not provided\n\
             ---------------------------------------------------\n"
        );
    }

    #[test]
    fn test_fields_in_fixed_order() {
        let metrics = BusinessMetrics::new()
            .with_revenue("A")
            .with_expenses("B")
            .with_customer_count("C");
        let block = build_context_block(Industry::Other, &metrics);
        let revenue = block.find("Revenue/Sales: A").unwrap();
        let expenses = block.find("Expenses/Costs: B").unwrap();
        let customers = block.find("Customer Count: C").unwrap();
        assert!(revenue < expenses && expenses < customers);
    }

    #[test]
    fn test_whitespace_metric_is_kept_verbatim() {
        let metrics = BusinessMetrics::new().with_revenue("   ");
        let block = build_context_block(Industry::Retail, &metrics);
        assert!(block.contains("Revenue/Sales:    \n"));
        assert!(block.contains("Expenses/Costs: Not provided\n"));
    }

    #[test]
    fn test_or_not_provided() {
        assert_eq!(or_not_provided(""), NOT_PROVIDED);
        assert_eq!(or_not_provided("  "), "  ");
        assert_eq!(or_not_provided("120"), "120");
    }

    #[test]
    fn test_values_pass_through_verbatim() {
        let metrics = BusinessMetrics::new().with_revenue("~ $1.2M (est.)");
        let block = build_context_block(Industry::Technology, &metrics);
        assert!(block.contains("Industry: Technology / SaaS\n"));
        assert!(block.contains("Revenue/Sales: ~ $1.2M (est.)\n"));
    }

    #[test]
    fn test_prompt_appends_query() {
        let ctx = BusinessContext::default();
        let prompt = ctx.compose_prompt("Why are my sales decreasing?");
        assert!(prompt.starts_with(&ctx.context_block()));
        assert!(prompt.ends_with(
            "---------------------------------------------------\n\nUser Query: Why are my sales decreasing?"
        ));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let ctx = BusinessContext::new(
            Industry::FoodBeverage,
            BusinessMetrics::new().with_revenue("9"),
        );
        assert_eq!(ctx.compose_prompt("q"), ctx.compose_prompt("q"));
    }
}
