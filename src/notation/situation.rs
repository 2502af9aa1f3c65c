use super::clause::Clause;
use super::token::{non_empty_lines, Tokens};
use super::GrammarError;

const HELP_LINE_1: &str = "IN +/- TF Element или RANGE +/- TF Element (UP/DOWN или +/- TF Element)";
const HELP_ZONE: &str = "Actual/Prev +/- TF DR Premium/Equilibrium/Discount";

/// Parses the two-line Range/Zone dialect of the current-situation block.
pub(super) fn parse(text: &str) -> Result<Clause, GrammarError> {
    let lines = non_empty_lines(text);
    if lines.len() != 2 {
        return Err(GrammarError::new(
            "Нотация должна содержать ровно 2 непустые строки.",
        ));
    }

    let mut head = Tokens::new(lines[0]);
    if head.accept_keyword("IN") {
        let element = head
            .element_ref()
            .and_then(|element| head.expect_end().map(|_| element))
            .map_err(|e| e.shape(&format!("1 строка: {HELP_LINE_1}")))?;

        let mut tail = Tokens::new(lines[1]);
        let zone = tail
            .zone_ref()
            .and_then(|zone| tail.expect_end().map(|_| zone))
            .map_err(|e| e.shape(&format!("2 строка: {HELP_ZONE}")))?;

        return Ok(Clause::Inside { element, zone });
    }

    if !head.accept_keyword("RANGE") {
        return Err(GrammarError::new(format!("1 строка: {HELP_LINE_1}")));
    }

    let first = head
        .element_ref()
        .map_err(|e| e.shape(&format!("1 строка: {HELP_LINE_1}")))?;

    // A direction marker right after the element fixes the single-element
    // form; a further sign token starts the second element of the two-element
    // form. Anything else is rejected below.
    if let Some(direction) = head.direction() {
        head.expect_end()
            .map_err(|e| e.shape(&format!("1 строка: {HELP_LINE_1}")))?;
        let mut tail = Tokens::new(lines[1]);
        let zone = tail
            .zone_ref()
            .and_then(|zone| tail.expect_end().map(|_| zone))
            .map_err(|e| e.shape(&format!("2 строка для RANGE с 1 элементом: {HELP_ZONE}")))?;
        return Ok(Clause::RangeSingle {
            element: first,
            zone,
            direction,
        });
    }

    if head.finished() {
        // Single-element form with the direction marker closing line 2 instead.
        let mut tail = Tokens::new(lines[1]);
        let shape = format!("2 строка для RANGE с 1 элементом: {HELP_ZONE} UP/DOWN");
        let zone = tail.zone_ref().map_err(|e| e.shape(&shape))?;
        let direction = tail.direction().ok_or_else(|| {
            GrammarError::new("Для RANGE с 1 элементом обязателен маркер UP или DOWN.")
                .shape(&shape)
        })?;
        tail.expect_end().map_err(|e| e.shape(&shape))?;
        return Ok(Clause::RangeSingle {
            element: first,
            zone,
            direction,
        });
    }

    let second = head
        .element_ref()
        .and_then(|second| head.expect_end().map(|_| second))
        .map_err(|e| e.shape(&format!("1 строка: {HELP_LINE_1}")))?;

    // Two-element form: line 2 holds two zone clauses joined by `|` or `;`.
    let parts: Vec<&str> = lines[1]
        .split(['|', ';'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
    let shape = format!("2 строка для RANGE с 2 элементами: {HELP_ZONE} | {HELP_ZONE}");
    if parts.len() != 2 {
        return Err(GrammarError::new("2 строка: <диапазон 1> | <диапазон 2>").shape(&shape));
    }
    let parse_part = |part: &str| {
        let mut tokens = Tokens::new(part);
        tokens
            .zone_ref()
            .and_then(|zone| tokens.expect_end().map(|_| zone))
            .map_err(|e| e.shape(&shape))
    };
    let first_zone = parse_part(parts[0])?;
    let second_zone = parse_part(parts[1])?;

    Ok(Clause::RangeDouble {
        first,
        first_zone,
        second,
        second_zone,
    })
}

#[cfg(test)]
mod tests {
    use super::super::clause::{Direction, RangeKind, Sign, Zone};
    use super::*;

    #[test]
    fn test_in_form() {
        let clause = parse("IN + H1 RB\nActual - H1 DR Premium").unwrap();
        match clause {
            Clause::Inside { element, zone } => {
                assert_eq!(element.sign, Sign::Bullish);
                assert_eq!(element.timeframe, "H1");
                assert_eq!(element.name, "RB");
                assert_eq!(zone.kind, RangeKind::Actual);
                assert_eq!(zone.zone, Zone::Premium);
            }
            other => panic!("unexpected clause: {other:?}"),
        }
    }

    #[test]
    fn test_range_single_direction_on_line_1() {
        let clause = parse("RANGE + H1 RB DOWN\nPrev - H4 DR Equilibrium").unwrap();
        match clause {
            Clause::RangeSingle {
                direction, zone, ..
            } => {
                assert_eq!(direction, Direction::Down);
                assert_eq!(zone.kind, RangeKind::Prev);
                assert_eq!(zone.zone, Zone::Equilibrium);
            }
            other => panic!("unexpected clause: {other:?}"),
        }
    }

    #[test]
    fn test_range_single_direction_on_line_2() {
        let clause = parse("RANGE + H1 RB\nPrev - H4 DR Equilibrium UP").unwrap();
        match clause {
            Clause::RangeSingle { direction, .. } => assert_eq!(direction, Direction::Up),
            other => panic!("unexpected clause: {other:?}"),
        }
    }

    #[test]
    fn test_range_single_requires_direction() {
        let error = parse("RANGE + H1 RB\nPrev - H4 DR Equilibrium").unwrap_err();
        assert!(error.message().contains("UP"));
    }

    #[test]
    fn test_range_double() {
        let clause =
            parse("RANGE + H1 RB - H4 FVG\nActual + H1 DR Premium; Prev - H4 DR Discount").unwrap();
        match clause {
            Clause::RangeDouble {
                first,
                second,
                first_zone,
                second_zone,
            } => {
                assert_eq!(first.name, "RB");
                assert_eq!(second.name, "FVG");
                assert_eq!(first_zone.zone, Zone::Premium);
                assert_eq!(second_zone.zone, Zone::Discount);
            }
            other => panic!("unexpected clause: {other:?}"),
        }
    }

    #[test]
    fn test_range_double_needs_two_zone_clauses() {
        let error = parse("RANGE + H1 RB - H4 FVG\nActual + H1 DR Premium").unwrap_err();
        assert!(error.message().contains("2 элементами"));
    }

    #[test]
    fn test_wrong_line_count() {
        let error = parse("IN + H1 RB").unwrap_err();
        assert!(error.message().contains("2 непустые строки"));
    }

    #[test]
    fn test_unknown_head_keyword() {
        let error = parse("OUT + H1 RB\nActual - H1 DR Premium").unwrap_err();
        assert!(error.message().contains("IN"));
        assert!(error.message().contains("RANGE"));
    }
}
