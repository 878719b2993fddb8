//! Input line parsing
//!
//! Lines starting with `/` are commands; everything else is a query for the
//! assistant.

use lca_conductor_core::{ModelId, UnknownModel};
use thiserror::Error;

/// A parsed input line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Show command help
    Help,
    /// List models and the current selection
    Models,
    /// Select a model for subsequent queries
    Model(ModelId),
    /// List example queries
    Examples,
    /// Submit the n-th example query
    Ask(usize),
    /// Print the whole conversation
    History,
    /// Leave the chat
    Quit,
    /// Free text for the assistant
    Query(String),
}

/// Errors from parsing a command line
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    /// Command name not recognised
    #[error("Unknown command '/{0}' (try /help)")]
    Unknown(String),

    /// Command needs an argument
    #[error("Usage: {0}")]
    MissingArgument(&'static str),

    /// Model id not in the catalog
    #[error(transparent)]
    Model(#[from] UnknownModel),

    /// Example number not a positive integer
    #[error("Not an example number: '{0}'")]
    BadNumber(String),
}

/// Help text listing every command
pub const HELP: &str = "\
Commands:
  /help           show this help
  /models         list available models
  /model <id>     use another model for the next questions
  /examples       list example questions
  /ask <n>        ask example question number n
  /history        print the conversation so far
  /quit           leave
Anything else is sent to the assistant.";

/// Parse one input line
///
/// # Errors
///
/// Returns a [`CommandError`] for malformed `/` commands.
pub fn parse(line: &str) -> Result<Command, CommandError> {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Ok(Command::Query(line.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    match name.to_ascii_lowercase().as_str() {
        "help" | "?" => Ok(Command::Help),
        "models" => Ok(Command::Models),
        "model" => {
            if arg.is_empty() {
                return Err(CommandError::MissingArgument("/model <flan|llama>"));
            }
            Ok(Command::Model(arg.parse()?))
        }
        "examples" => Ok(Command::Examples),
        "ask" => {
            if arg.is_empty() {
                return Err(CommandError::MissingArgument("/ask <n>"));
            }
            match arg.parse::<usize>() {
                Ok(n) if n > 0 => Ok(Command::Ask(n)),
                _ => Err(CommandError::BadNumber(arg.to_string())),
            }
        }
        "history" => Ok(Command::History),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_text_is_query() {
        assert_eq!(
            parse("What is LCA?").unwrap(),
            Command::Query("What is LCA?".to_string())
        );
        // Trimming and the empty check belong to the session
        assert_eq!(parse("  ").unwrap(), Command::Query("  ".to_string()));
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse("/help").unwrap(), Command::Help);
        assert_eq!(parse("/models").unwrap(), Command::Models);
        assert_eq!(parse("/examples").unwrap(), Command::Examples);
        assert_eq!(parse("/history").unwrap(), Command::History);
        assert_eq!(parse("  /QUIT ").unwrap(), Command::Quit);
    }

    #[test]
    fn test_model_command() {
        assert_eq!(parse("/model llama").unwrap(), Command::Model(ModelId::Llama));
        assert_eq!(parse("/model  Flan ").unwrap(), Command::Model(ModelId::Flan));
        assert!(matches!(parse("/model gpt"), Err(CommandError::Model(_))));
        assert!(matches!(
            parse("/model"),
            Err(CommandError::MissingArgument(_))
        ));
    }

    #[test]
    fn test_ask_command() {
        assert_eq!(parse("/ask 3").unwrap(), Command::Ask(3));
        assert_eq!(
            parse("/ask 0"),
            Err(CommandError::BadNumber("0".to_string()))
        );
        assert_eq!(
            parse("/ask two"),
            Err(CommandError::BadNumber("two".to_string()))
        );
    }

    #[test]
    fn test_unknown_command() {
        let err = parse("/frobnicate now").unwrap_err();
        assert_eq!(err, CommandError::Unknown("frobnicate".to_string()));
        assert!(err.to_string().contains("/help"));
    }
}
