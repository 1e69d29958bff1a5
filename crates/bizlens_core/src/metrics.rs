//! Industry selection and free-text business metrics

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Business sector the user operates in. Purely contextual for the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Industry {
    #[default]
    #[serde(rename = "Retail")]
    Retail,
    #[serde(rename = "E-commerce")]
    ECommerce,
    #[serde(rename = "Food & Beverage")]
    FoodBeverage,
    #[serde(rename = "Technology / SaaS")]
    Technology,
    #[serde(rename = "Professional Services")]
    Services,
    #[serde(rename = "Other")]
    Other,
}

impl Industry {
    pub const ALL: [Industry; 6] = [
        Industry::Retail,
        Industry::ECommerce,
        Industry::FoodBeverage,
        Industry::Technology,
        Industry::Services,
        Industry::Other,
    ];

    /// Label as shown to the user and embedded in prompts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Industry::Retail => "Retail",
            Industry::ECommerce => "E-commerce",
            Industry::FoodBeverage => "Food & Beverage",
            Industry::Technology => "Technology / SaaS",
            Industry::Services => "Professional Services",
            Industry::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown industry '{0}' (expected one of: retail, ecommerce, food, tech, services, other)")]
pub struct ParseIndustryError(pub String);

impl FromStr for Industry {
    type Err = ParseIndustryError;

    /// Accepts the display label or a short alias, ignoring case and punctuation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match key.as_str() {
            "retail" => Ok(Industry::Retail),
            "ecommerce" | "eshop" | "online" => Ok(Industry::ECommerce),
            "foodbeverage" | "foodandbeverage" | "food" | "fb" | "fnb" => Ok(Industry::FoodBeverage),
            "technologysaas" | "technology" | "tech" | "saas" => Ok(Industry::Technology),
            "professionalservices" | "services" | "professional" => Ok(Industry::Services),
            "other" => Ok(Industry::Other),
            _ => Err(ParseIndustryError(s.to_string())),
        }
    }
}

impl std::fmt::Display for Industry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied figures. Values are opaque text and are never parsed;
/// an empty value means "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessMetrics {
    #[serde(default)]
    pub revenue: String,
    #[serde(default)]
    pub expenses: String,
    #[serde(default)]
    pub customer_count: String,
}

impl BusinessMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_revenue(mut self, revenue: impl Into<String>) -> Self {
        self.revenue = revenue.into();
        self
    }

    pub fn with_expenses(mut self, expenses: impl Into<String>) -> Self {
        self.expenses = expenses.into();
        self
    }

    pub fn with_customer_count(mut self, customer_count: impl Into<String>) -> Self {
        self.customer_count = customer_count.into();
        self
    }

    /// True when no field carries a value.
    pub fn is_empty(&self) -> bool {
        [&self.revenue, &self.expenses, &self.customer_count]
            .iter()
            .all(|v| v.is_empty())
    }
}
