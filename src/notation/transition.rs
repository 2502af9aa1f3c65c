use super::clause::{Action, ActionClause, Clause, WithClause};
use super::token::{non_empty_lines, Tokens};
use super::GrammarError;

const HELP_ACTION: &str = "CREATE/NOT CREATE +/- TF Element [Actual/Prev +/- TF DR Zone] \
[WITH +/- TF Element Actual/Prev +/- TF DR Zone BREAK/NOT BREAK] \
или GET/NOT GET +/- TF Element Actual/Prev +/- TF DR Zone";

/// Parses the single-line Transition-Action dialect.
pub(super) fn parse(text: &str) -> Result<Clause, GrammarError> {
    let lines = non_empty_lines(text);
    if lines.len() != 1 {
        return Err(GrammarError::new(
            "Нотация должна содержать ровно 1 непустую строку.",
        ));
    }

    let mut tokens = Tokens::new(lines[0]);
    let action = tokens
        .action()
        .ok_or_else(|| GrammarError::new(format!("Формат нотации: {HELP_ACTION}")))?;
    let primary = tokens
        .element_ref()
        .map_err(|e| e.shape(HELP_ACTION))?;

    let clause = match action {
        Action::Get | Action::NotGet => {
            // The zone clause is mandatory and WITH is forbidden here.
            if tokens.peek_keyword("WITH") {
                return Err(GrammarError::new(
                    "Для GET/NOT GET блок WITH не допускается.",
                )
                .shape(HELP_ACTION));
            }
            let zone = tokens.zone_ref().map_err(|e| {
                e.shape("GET/NOT GET +/- TF Element Actual/Prev +/- TF DR Premium/Discount/Equilibrium")
            })?;
            if tokens.peek_keyword("WITH") {
                return Err(GrammarError::new(
                    "Для GET/NOT GET блок WITH не допускается.",
                )
                .shape(HELP_ACTION));
            }
            ActionClause {
                action,
                primary,
                zone: Some(zone),
                with: None,
            }
        }
        Action::Create => {
            let zone = if tokens.peek_range_kind() {
                Some(tokens.zone_ref().map_err(|e| e.shape(HELP_ACTION))?)
            } else {
                None
            };
            let with = parse_with(&mut tokens)?;
            if let Some(with_clause) = &with {
                // A WITH clause on CREATE must state the outcome explicitly.
                if with_clause.break_mode.is_none() {
                    return Err(GrammarError::new(
                        "После блока WITH для CREATE обязателен маркер BREAK или NOT BREAK.",
                    )
                    .shape(HELP_ACTION));
                }
            }
            ActionClause {
                action,
                primary,
                zone,
                with,
            }
        }
        Action::NotCreate => {
            if tokens.peek_range_kind() {
                return Err(GrammarError::new(
                    "Для NOT CREATE указывается только +/- TF Element и необязательный блок WITH.",
                )
                .shape(HELP_ACTION));
            }
            let with = parse_with(&mut tokens)?;
            ActionClause {
                action,
                primary,
                zone: None,
                with,
            }
        }
    };

    tokens.expect_end().map_err(|e| e.shape(HELP_ACTION))?;
    Ok(Clause::Action(clause))
}

/// `WITH +/- TF Element Actual/Prev +/- TF DR Zone [BREAK|NOT BREAK]`.
fn parse_with(tokens: &mut Tokens) -> Result<Option<WithClause>, GrammarError> {
    if !tokens.accept_keyword("WITH") {
        return Ok(None);
    }
    let shape = "WITH +/- TF Element Actual/Prev +/- TF DR Zone BREAK/NOT BREAK";
    let element = tokens.element_ref().map_err(|e| e.shape(shape))?;
    let zone = tokens.zone_ref().map_err(|e| e.shape(shape))?;
    let break_mode = tokens.break_mode();
    Ok(Some(WithClause {
        element,
        zone,
        break_mode,
    }))
}

#[cfg(test)]
mod tests {
    use super::super::clause::{BreakMode, RangeKind, Sign, Zone};
    use super::*;

    fn action_clause(text: &str) -> ActionClause {
        match parse(text).unwrap() {
            Clause::Action(clause) => clause,
            other => panic!("unexpected clause: {other:?}"),
        }
    }

    #[test]
    fn test_plain_create() {
        let clause = action_clause("CREATE + H1 OB");
        assert_eq!(clause.action, Action::Create);
        assert_eq!(clause.primary.name, "OB");
        assert!(clause.zone.is_none());
        assert!(clause.with.is_none());
    }

    #[test]
    fn test_create_with_zone_clause() {
        let clause = action_clause("CREATE + H1 OB ACTUAL - H4 DR Premium");
        let zone = clause.zone.unwrap();
        assert_eq!(zone.kind, RangeKind::Actual);
        assert_eq!(zone.timeframe, "H4");
        assert_eq!(zone.zone, Zone::Premium);
    }

    #[test]
    fn test_create_with_clause_and_break() {
        let clause = action_clause("CREATE + M5 FVG WITH - H1 OB PREV + D1 DR Discount BREAK");
        let with = clause.with.unwrap();
        assert_eq!(with.element.sign, Sign::Bearish);
        assert_eq!(with.element.name, "OB");
        assert_eq!(with.zone.zone, Zone::Discount);
        assert_eq!(with.break_mode, Some(BreakMode::Break));
    }

    #[test]
    fn test_create_with_clause_requires_break_marker() {
        let error = parse("CREATE + M5 FVG WITH - H1 OB PREV + D1 DR Discount").unwrap_err();
        assert!(error.message().contains("BREAK"));
        assert!(error.message().contains("NOT BREAK"));
    }

    #[test]
    fn test_not_create_allows_with_without_break_marker() {
        let clause = action_clause("NOT CREATE - M15 FVG WITH + H1 RB ACTUAL + H4 DR Premium");
        assert_eq!(clause.action, Action::NotCreate);
        assert!(clause.with.unwrap().break_mode.is_none());
    }

    #[test]
    fn test_not_create_rejects_direct_zone_clause() {
        let error = parse("NOT CREATE + H1 OB ACTUAL - H4 DR Premium").unwrap_err();
        assert!(error.message().contains("NOT CREATE"));
    }

    #[test]
    fn test_get_requires_zone_clause() {
        let clause = action_clause("GET + H1 OB ACTUAL - H4 DR Premium");
        assert_eq!(clause.action, Action::Get);
        assert!(clause.zone.is_some());

        let error = parse("GET + H1 OB").unwrap_err();
        assert!(error.message().contains("ACTUAL"));
    }

    #[test]
    fn test_get_rejects_with_clause() {
        let error =
            parse("GET + H1 OB ACTUAL - H4 DR Premium WITH + H1 RB PREV - D1 DR Discount BREAK")
                .unwrap_err();
        assert!(error.message().contains("WITH"));
    }

    #[test]
    fn test_not_get_underscore_spelling() {
        let clause = action_clause("NOT_GET - M30 FVG PREV + D1 DR Equilibrium");
        assert_eq!(clause.action, Action::NotGet);
        assert_eq!(clause.primary.timeframe, "M30");
    }

    #[test]
    fn test_unknown_action() {
        let error = parse("SOMETHING + H1 OB").unwrap_err();
        assert!(error.message().contains("CREATE/NOT CREATE"));
    }

    #[test]
    fn test_two_lines_rejected() {
        let error = parse("CREATE + H1 OB\nGET + H1 OB ACTUAL - H4 DR Premium").unwrap_err();
        assert!(error.message().contains("1 непустую строку"));
    }
}
