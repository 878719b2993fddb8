//! Plain-text rendering of turns and session updates

use lca_conductor_core::{ModelId, SessionPhase, SessionUpdate, Sender, SubmitOutcome, Turn};

/// Heading above a bot turn's source list
pub const SOURCES_HEADER: &str = "Sources from LCA Knowledge Base:";

/// Display name of the turn's author
fn author(sender: Sender) -> &'static str {
    match sender {
        Sender::User => "You",
        Sender::Bot => "LCA Assistant",
    }
}

/// Render one turn with its time and, for bot turns, its sources
pub fn format_turn(turn: &Turn) -> String {
    let mut out = format!(
        "[{}] {}: {}",
        turn.display_time(),
        author(turn.sender()),
        turn.content()
    );

    if let Some(sources) = turn.sources().filter(|s| !s.is_empty()) {
        out.push('\n');
        out.push_str("  ");
        out.push_str(SOURCES_HEADER);
        for source in sources {
            out.push_str("\n    - ");
            out.push_str(source);
        }
    }
    out
}

/// Render the model picker, marking the current selection
pub fn format_models(selected: ModelId) -> String {
    ModelId::ALL
        .iter()
        .map(|model| {
            let marker = if *model == selected { '*' } else { ' ' };
            format!("{marker} {:<6} {}", model.as_str(), model.label())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Line to print after a submission, if any
///
/// With `echo`, an accepted query is shown as the user's line; queries the
/// session refused are never echoed.
pub fn format_submission(query: &str, outcome: &SubmitOutcome, echo: bool) -> Option<String> {
    match outcome {
        SubmitOutcome::Accepted { .. } if echo => Some(format!("{}: {query}", author(Sender::User))),
        _ => outcome.notice(),
    }
}

/// Line to print for an update, if any
///
/// User turns are skipped: the terminal already shows what was typed.
pub fn format_update(update: &SessionUpdate) -> Option<String> {
    match update {
        SessionUpdate::TurnAppended { turn } if turn.is_user() => None,
        SessionUpdate::TurnAppended { turn } => Some(format_turn(turn)),
        SessionUpdate::BusyChanged { busy: true } => {
            Some(SessionPhase::Awaiting.description().to_string())
        }
        SessionUpdate::BusyChanged { busy: false } => None,
        SessionUpdate::ModelChanged { model } => {
            Some(format!("Model set to {} ({})", model.label(), model))
        }
        SessionUpdate::Closed => Some("Session closed.".to_string()),
    }
}
