//! Line parser for the interactive session.
//!
//! Lines starting with `/` are commands; anything else is a question for
//! the analyst.

use bizlens_constant::prompt::SAMPLE_QUESTIONS;
use bizlens_core::Industry;

pub const HELP: &str = "\
Commands:
  /industry <name>    Set the industry (retail, ecommerce, food, tech, services, other)
  /revenue [value]    Set revenue/sales; no value clears it
  /expenses [value]   Set expenses/costs; no value clears it
  /customers [value]  Set customer count; no value clears it
  /metrics            Show the current business context
  /samples            List sample questions
  /sample <n>         Ask sample question n
  /clear              Start a new conversation
  /help               Show this help
  /quit               Leave the session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Empty,
    Message(String),
    Command(Command),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Industry(Industry),
    Revenue(String),
    Expenses(String),
    Customers(String),
    Metrics,
    Samples,
    /// Zero-based index into the sample questions.
    Sample(usize),
    Clear,
    Help,
    Quit,
}

/// Parse one input line. `Err` carries a message for the user.
pub fn parse(line: &str) -> Result<Input, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(Input::Empty);
    }
    let Some(body) = trimmed.strip_prefix('/') else {
        return Ok(Input::Message(trimmed.to_string()));
    };

    let (name, arg) = match body.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (body, ""),
    };

    let command = match name.to_ascii_lowercase().as_str() {
        "industry" => {
            if arg.is_empty() {
                return Err("usage: /industry <name>".to_string());
            }
            Command::Industry(arg.parse::<Industry>().map_err(|e| e.to_string())?)
        }
        "revenue" | "sales" => Command::Revenue(arg.to_string()),
        "expenses" | "costs" => Command::Expenses(arg.to_string()),
        "customers" => Command::Customers(arg.to_string()),
        "metrics" | "context" => Command::Metrics,
        "samples" => Command::Samples,
        "sample" => Command::Sample(parse_sample_index(arg)?),
        "clear" | "new" => Command::Clear,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command '/{other}' (try /help)")),
    };
    Ok(Input::Command(command))
}

fn parse_sample_index(arg: &str) -> Result<usize, String> {
    let count = SAMPLE_QUESTIONS.len();
    match arg.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Ok(n - 1),
        _ => Err(format!("usage: /sample <1-{count}>")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_are_empty() {
        assert_eq!(parse(""), Ok(Input::Empty));
        assert_eq!(parse("   \t"), Ok(Input::Empty));
    }

    #[test]
    fn test_plain_text_is_a_message() {
        assert_eq!(
            parse("  Why are sales down?  "),
            Ok(Input::Message("Why are sales down?".to_string()))
        );
    }

    #[test]
    fn test_metric_commands_keep_free_text() {
        assert_eq!(
            parse("/revenue $120k / month"),
            Ok(Input::Command(Command::Revenue("$120k / month".to_string())))
        );
        assert_eq!(
            parse("/customers"),
            Ok(Input::Command(Command::Customers(String::new())))
        );
        assert_eq!(
            parse("/EXPENSES 80k"),
            Ok(Input::Command(Command::Expenses("80k".to_string())))
        );
    }

    #[test]
    fn test_industry_accepts_labels() {
        assert_eq!(
            parse("/industry Food & Beverage"),
            Ok(Input::Command(Command::Industry(Industry::FoodBeverage)))
        );
        assert!(parse("/industry").is_err());
        assert!(parse("/industry mining").unwrap_err().contains("mining"));
    }

    #[test]
    fn test_sample_is_one_based_and_bounded() {
        assert_eq!(parse("/sample 1"), Ok(Input::Command(Command::Sample(0))));
        assert_eq!(
            parse(&format!("/sample {}", SAMPLE_QUESTIONS.len())),
            Ok(Input::Command(Command::Sample(SAMPLE_QUESTIONS.len() - 1)))
        );
        assert!(parse("/sample 0").is_err());
        assert!(parse("/sample 99").is_err());
        assert!(parse("/sample two").is_err());
    }

    #[test]
    fn test_unknown_command() {
        let err = parse("/frobnicate").unwrap_err();
        assert!(err.contains("/frobnicate"));
    }

    #[test]
    fn test_aliases() {
        assert_eq!(parse("/exit"), Ok(Input::Command(Command::Quit)));
        assert_eq!(parse("/new"), Ok(Input::Command(Command::Clear)));
        assert_eq!(parse("/context"), Ok(Input::Command(Command::Metrics)));
    }
}
