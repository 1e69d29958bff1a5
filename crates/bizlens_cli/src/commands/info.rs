//! `bizlens industries` and `bizlens samples`.

use anyhow::Result;
use bizlens_constant::prompt::SAMPLE_QUESTIONS;
use bizlens_core::Industry;
use serde::Serialize;

use crate::output;

/// Shortest value accepted by `--industry` and `/industry`.
fn flag_value(industry: Industry) -> &'static str {
    match industry {
        Industry::Retail => "retail",
        Industry::ECommerce => "ecommerce",
        Industry::FoodBeverage => "food",
        Industry::Technology => "tech",
        Industry::Services => "services",
        Industry::Other => "other",
    }
}

#[derive(Serialize)]
struct IndustryItem {
    name: &'static str,
    value: &'static str,
}

pub fn industries() -> Result<()> {
    output::header("Industries");

    let mut table = output::table();
    output::table_header(&mut table, &["Industry", "Use"]);

    let items: Vec<_> = Industry::ALL
        .iter()
        .map(|&industry| {
            let item = IndustryItem {
                name: industry.as_str(),
                value: flag_value(industry),
            };
            let flag = format!("--industry {}", item.value);
            output::table_row(&mut table, &[item.name, flag.as_str()]);
            item
        })
        .collect();

    output::table_print(&table, &items);
    Ok(())
}

#[derive(Serialize)]
struct SampleItem {
    number: usize,
    question: &'static str,
}

pub fn samples() -> Result<()> {
    output::header("Sample questions");

    let mut table = output::table();
    output::table_header(&mut table, &["#", "Question"]);

    let items: Vec<_> = SAMPLE_QUESTIONS
        .iter()
        .enumerate()
        .map(|(i, &question)| {
            let number = i + 1;
            output::table_row(&mut table, &[number.to_string().as_str(), question]);
            SampleItem { number, question }
        })
        .collect();

    output::table_print(&table, &items);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_values_parse_back() {
        for industry in Industry::ALL {
            assert_eq!(flag_value(industry).parse::<Industry>().unwrap(), industry);
        }
    }
}
