//! The notation grammar engine.
//!
//! Traders write market structure in a compact shorthand ("notation"); this
//! module parses the three dialects of that shorthand into typed clauses and
//! compiles clauses into readable sentences. Parsing is total: malformed
//! input yields a [`GrammarError`] describing the expected shape, never a
//! panic.

mod clause;
pub use clause::{
    Action, ActionClause, Advantage, BreakMode, Clause, Direction, ElementRef, Level,
    MeaningClause, Qualifier, RangeKind, Side, Sign, WithClause, Zone, ZoneRef,
};

mod token;
pub use token::{ELEMENT_NAMES, TIMEFRAMES};

mod meaning;
mod situation;
mod transition;

mod render;
pub use render::render;

/// The three notation mini-languages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dialect {
    /// Two-line range/zone shorthand of the current-situation block.
    Range,
    /// One-line CREATE/GET action shorthand of the transition block.
    TransitionAction,
    /// One-line ADV/NOT ADV meaning shorthand of the transition block.
    TransitionMeaning,
}

/// Malformed notation, carrying a human-readable hint about the shape the
/// parser expected at the point it stopped.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct GrammarError(String);

impl GrammarError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// Appends the expected shape of the branch that was being attempted.
    pub(crate) fn shape(self, shape: &str) -> Self {
        Self(format!("{} Ожидаемый формат: {shape}.", self.0))
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Parses notation text into a typed clause.
pub fn parse(dialect: Dialect, text: &str) -> Result<Clause, GrammarError> {
    match dialect {
        Dialect::Range => situation::parse(text),
        Dialect::TransitionAction => transition::parse(text),
        Dialect::TransitionMeaning => meaning::parse(text),
    }
}

/// Parses notation text and compiles it straight into a sentence.
pub fn translate(dialect: Dialect, text: &str) -> Result<String, GrammarError> {
    parse(dialect, text).map(|clause| render(&clause))
}

/// Cheap probe for the action keyword of a Transition-Action line, usable on
/// incomplete input. Returns `None` for anything that is not a single line
/// opening with an action keyword.
pub fn action_of(text: &str) -> Option<Action> {
    let lines = token::non_empty_lines(text);
    if lines.len() != 1 {
        return None;
    }
    token::Tokens::new(lines[0]).action()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_returns_sentence_or_error() {
        assert!(translate(Dialect::Range, "IN + H1 RB\nActual - H1 DR Premium").is_ok());
        let error = translate(Dialect::Range, "garbage").unwrap_err();
        assert!(!error.message().is_empty());
    }

    #[test]
    fn test_action_of_probes_incomplete_input() {
        assert_eq!(action_of("CREATE"), Some(Action::Create));
        assert_eq!(action_of("NOT CREATE + H1 OB"), Some(Action::NotCreate));
        assert_eq!(action_of("NOT_GET"), Some(Action::NotGet));
        assert_eq!(action_of("SOMETHING + H1 OB"), None);
        assert_eq!(action_of("CREATE\nCREATE"), None);
    }
}
