use super::clause::{Clause, MeaningClause, Qualifier};
use super::token::{non_empty_lines, Tokens};
use super::GrammarError;

const HELP_MEANING: &str =
    "ADV/NOT ADV BUY/SELL UP/LOW (+/- TF Element | Actual/Prev +/- TF DR Premium/Discount/Equilibrium)";

/// Parses the single-line Transition-Meaning dialect.
pub(super) fn parse(text: &str) -> Result<Clause, GrammarError> {
    let lines = non_empty_lines(text);
    if lines.len() != 1 {
        return Err(GrammarError::new(
            "Нотация должна содержать ровно 1 непустую строку.",
        ));
    }

    let mut tokens = Tokens::new(lines[0]);
    let advantage = tokens
        .advantage()
        .ok_or_else(|| GrammarError::new(format!("Формат нотации: {HELP_MEANING}")))?;
    let side = tokens.side().map_err(|e| e.shape(HELP_MEANING))?;
    let level = tokens.level().map_err(|e| e.shape(HELP_MEANING))?;

    let qualifier_shape = "После ADV/NOT ADV BUY/SELL UP/LOW укажите +/- TF Element \
или Actual/Prev +/- TF DR Premium/Discount/Equilibrium";
    let qualifier = if tokens.peek_range_kind() {
        Qualifier::Zone(tokens.zone_ref().map_err(|e| e.shape(qualifier_shape))?)
    } else {
        Qualifier::Element(tokens.element_ref().map_err(|e| e.shape(qualifier_shape))?)
    };
    tokens.expect_end().map_err(|e| e.shape(qualifier_shape))?;

    Ok(Clause::Meaning(MeaningClause {
        advantage,
        side,
        level,
        qualifier,
    }))
}

#[cfg(test)]
mod tests {
    use super::super::clause::{Advantage, Level, RangeKind, Side, Zone};
    use super::*;

    fn meaning_clause(text: &str) -> MeaningClause {
        match parse(text).unwrap() {
            Clause::Meaning(clause) => clause,
            other => panic!("unexpected clause: {other:?}"),
        }
    }

    #[test]
    fn test_element_qualifier() {
        let clause = meaning_clause("ADV BUY UP + H1 OB");
        assert_eq!(clause.advantage, Advantage::Adv);
        assert_eq!(clause.side, Side::Buy);
        assert_eq!(clause.level, Level::Up);
        match clause.qualifier {
            Qualifier::Element(element) => assert_eq!(element.name, "OB"),
            other => panic!("unexpected qualifier: {other:?}"),
        }
    }

    #[test]
    fn test_zone_qualifier() {
        let clause = meaning_clause("NOT ADV SELL LOW PREV - H4 DR Discount");
        assert_eq!(clause.advantage, Advantage::NotAdv);
        assert_eq!(clause.side, Side::Sell);
        assert_eq!(clause.level, Level::Low);
        match clause.qualifier {
            Qualifier::Zone(zone) => {
                assert_eq!(zone.kind, RangeKind::Prev);
                assert_eq!(zone.zone, Zone::Discount);
            }
            other => panic!("unexpected qualifier: {other:?}"),
        }
    }

    #[test]
    fn test_underscore_spelling() {
        let clause = meaning_clause("NOT_ADV BUY LOW + M5 FVG");
        assert_eq!(clause.advantage, Advantage::NotAdv);
    }

    #[test]
    fn test_missing_qualifier() {
        let error = parse("ADV BUY UP").unwrap_err();
        assert!(error.message().contains("укажите"));
    }

    #[test]
    fn test_unknown_head() {
        let error = parse("MAYBE BUY UP + H1 OB").unwrap_err();
        assert!(error.message().contains("ADV/NOT ADV"));
    }
}
