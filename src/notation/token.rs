use super::clause::{
    Action, Advantage, BreakMode, Direction, ElementRef, Level, RangeKind, Side, Sign, Zone,
    ZoneRef,
};
use super::GrammarError;

/// Every timeframe label the grammar accepts, in canonical spelling.
/// Matching is case-insensitive; the canonical spelling is what ends up in
/// clauses and rendered sentences.
pub const TIMEFRAMES: [&str; 9] = ["M1", "M5", "M15", "M30", "H1", "H4", "D1", "W1", "MN"];

/// Recommended element names. The grammar accepts any identifier; this list
/// exists for editor completion and hints only.
pub const ELEMENT_NAMES: [&str; 5] = ["RB", "FVG", "SNR", "FL", "FH"];

/// Splits notation text into its non-empty trimmed lines.
pub(super) fn non_empty_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Cursor over the whitespace-separated tokens of a single notation line.
///
/// All helpers are case-insensitive and consume tokens only on success, so a
/// caller can dispatch on `peek`-style probes without backtracking.
pub(super) struct Tokens<'a> {
    items: Vec<&'a str>,
    pos: usize,
}

impl<'a> Tokens<'a> {
    pub fn new(line: &'a str) -> Self {
        Self {
            items: line.split_whitespace().collect(),
            pos: 0,
        }
    }

    pub fn peek(&self) -> Option<&'a str> {
        self.items.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<&'a str> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    pub fn finished(&self) -> bool {
        self.pos >= self.items.len()
    }

    /// Errors when any token is left unconsumed, naming the first leftover.
    pub fn expect_end(&self) -> Result<(), GrammarError> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(GrammarError::new(format!(
                "Лишний токен '{token}' в конце строки."
            ))),
        }
    }

    fn require(&mut self, what: &str) -> Result<&'a str, GrammarError> {
        self.advance()
            .ok_or_else(|| GrammarError::new(format!("Строка оборвалась: ожидалось {what}.")))
    }

    /// Consumes the next token if it equals the keyword, case-insensitively.
    pub fn accept_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn peek_keyword(&self, keyword: &str) -> bool {
        self.peek()
            .is_some_and(|token| token.eq_ignore_ascii_case(keyword))
    }

    /// Whether the next token opens a zone clause (`ACTUAL`/`PREV`).
    pub fn peek_range_kind(&self) -> bool {
        self.peek_keyword("ACTUAL") || self.peek_keyword("PREV")
    }

    pub fn sign(&mut self) -> Result<Sign, GrammarError> {
        let token = self.require("знак '+' или '-'")?;
        match token {
            "+" => Ok(Sign::Bullish),
            "-" => Ok(Sign::Bearish),
            _ => Err(GrammarError::new(format!(
                "Ожидался знак '+' или '-', получено '{token}'."
            ))),
        }
    }

    pub fn timeframe(&mut self) -> Result<String, GrammarError> {
        let token = self.require("TF")?;
        TIMEFRAMES
            .iter()
            .find(|tf| tf.eq_ignore_ascii_case(token))
            .map(|tf| tf.to_string())
            .ok_or_else(|| {
                GrammarError::new(format!(
                    "Неизвестный TF '{token}'. Допустимые: {}.",
                    TIMEFRAMES.join(", ")
                ))
            })
    }

    pub fn element_name(&mut self) -> Result<String, GrammarError> {
        let token = self.require("имя элемента")?;
        let mut chars = token.chars();
        let well_formed = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if well_formed {
            Ok(token.to_string())
        } else {
            Err(GrammarError::new(format!(
                "Ожидалось имя элемента (например, {}), получено '{token}'.",
                ELEMENT_NAMES.join("/")
            )))
        }
    }

    /// `+/- TF Element`.
    pub fn element_ref(&mut self) -> Result<ElementRef, GrammarError> {
        Ok(ElementRef {
            sign: self.sign()?,
            timeframe: self.timeframe()?,
            name: self.element_name()?,
        })
    }

    fn range_kind(&mut self) -> Result<RangeKind, GrammarError> {
        let token = self.require("ACTUAL или PREV")?;
        if token.eq_ignore_ascii_case("ACTUAL") {
            Ok(RangeKind::Actual)
        } else if token.eq_ignore_ascii_case("PREV") {
            Ok(RangeKind::Prev)
        } else {
            Err(GrammarError::new(format!(
                "Ожидалось ACTUAL или PREV, получено '{token}'."
            )))
        }
    }

    fn zone(&mut self) -> Result<Zone, GrammarError> {
        let token = self.require("Premium/Equilibrium/Discount")?;
        if token.eq_ignore_ascii_case("PREMIUM") {
            Ok(Zone::Premium)
        } else if token.eq_ignore_ascii_case("EQUILIBRIUM") {
            Ok(Zone::Equilibrium)
        } else if token.eq_ignore_ascii_case("DISCOUNT") {
            Ok(Zone::Discount)
        } else {
            Err(GrammarError::new(format!(
                "Ожидалась зона Premium/Equilibrium/Discount, получено '{token}'."
            )))
        }
    }

    /// `Actual/Prev +/- TF [DR] Zone`. The DR marker is optional on input
    /// and always present in serialized notation.
    pub fn zone_ref(&mut self) -> Result<ZoneRef, GrammarError> {
        let kind = self.range_kind()?;
        let sign = self.sign()?;
        let timeframe = self.timeframe()?;
        self.accept_keyword("DR");
        let zone = self.zone()?;
        Ok(ZoneRef {
            kind,
            sign,
            timeframe,
            zone,
        })
    }

    /// Consumes a trailing `UP`/`DOWN` marker if present.
    pub fn direction(&mut self) -> Option<Direction> {
        if self.accept_keyword("UP") {
            Some(Direction::Up)
        } else if self.accept_keyword("DOWN") {
            Some(Direction::Down)
        } else {
            None
        }
    }

    /// Action keyword, including the `NOT_CREATE`/`NOT_GET` one-token
    /// spellings. Consumes nothing when the line starts with something else.
    pub fn action(&mut self) -> Option<Action> {
        if self.accept_keyword("CREATE") {
            return Some(Action::Create);
        }
        if self.accept_keyword("NOT_CREATE") {
            return Some(Action::NotCreate);
        }
        if self.accept_keyword("GET") {
            return Some(Action::Get);
        }
        if self.accept_keyword("NOT_GET") {
            return Some(Action::NotGet);
        }
        if self.peek_keyword("NOT") {
            let negated = match self.items.get(self.pos + 1) {
                Some(token) if token.eq_ignore_ascii_case("CREATE") => Action::NotCreate,
                Some(token) if token.eq_ignore_ascii_case("GET") => Action::NotGet,
                _ => return None,
            };
            self.pos += 2;
            return Some(negated);
        }
        None
    }

    /// `ADV`, `NOT ADV` or `NOT_ADV` head of a meaning line.
    pub fn advantage(&mut self) -> Option<Advantage> {
        if self.accept_keyword("ADV") {
            return Some(Advantage::Adv);
        }
        if self.accept_keyword("NOT_ADV") {
            return Some(Advantage::NotAdv);
        }
        if self.peek_keyword("NOT")
            && self
                .items
                .get(self.pos + 1)
                .is_some_and(|token| token.eq_ignore_ascii_case("ADV"))
        {
            self.pos += 2;
            return Some(Advantage::NotAdv);
        }
        None
    }

    pub fn side(&mut self) -> Result<Side, GrammarError> {
        let token = self.require("BUY или SELL")?;
        if token.eq_ignore_ascii_case("BUY") {
            Ok(Side::Buy)
        } else if token.eq_ignore_ascii_case("SELL") {
            Ok(Side::Sell)
        } else {
            Err(GrammarError::new(format!(
                "Ожидалось BUY или SELL, получено '{token}'."
            )))
        }
    }

    pub fn level(&mut self) -> Result<Level, GrammarError> {
        let token = self.require("UP или LOW")?;
        if token.eq_ignore_ascii_case("UP") {
            Ok(Level::Up)
        } else if token.eq_ignore_ascii_case("LOW") {
            Ok(Level::Low)
        } else {
            Err(GrammarError::new(format!(
                "Ожидалось UP или LOW, получено '{token}'."
            )))
        }
    }

    /// `BREAK`, `NOT BREAK` or `NOT_BREAK`, if present.
    pub fn break_mode(&mut self) -> Option<BreakMode> {
        if self.accept_keyword("BREAK") {
            return Some(BreakMode::Break);
        }
        if self.accept_keyword("NOT_BREAK") {
            return Some(BreakMode::NotBreak);
        }
        if self.peek_keyword("NOT")
            && self
                .items
                .get(self.pos + 1)
                .is_some_and(|token| token.eq_ignore_ascii_case("BREAK"))
        {
            self.pos += 2;
            return Some(BreakMode::NotBreak);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframes_case_insensitive() {
        let mut tokens = Tokens::new("h4 m30 D1 mn");
        assert_eq!(tokens.timeframe().unwrap(), "H4");
        assert_eq!(tokens.timeframe().unwrap(), "M30");
        assert_eq!(tokens.timeframe().unwrap(), "D1");
        assert_eq!(tokens.timeframe().unwrap(), "MN");
        assert!(tokens.finished());
    }

    #[test]
    fn test_unknown_timeframe_names_alternatives() {
        let mut tokens = Tokens::new("H7");
        let error = tokens.timeframe().unwrap_err();
        assert!(error.message().contains("H7"));
        assert!(error.message().contains("H4"));
    }

    #[test]
    fn test_element_ref() {
        let mut tokens = Tokens::new("+ h1 RB");
        let element = tokens.element_ref().unwrap();
        assert_eq!(element.sign, Sign::Bullish);
        assert_eq!(element.timeframe, "H1");
        assert_eq!(element.name, "RB");
    }

    #[test]
    fn test_zone_ref_accepts_missing_dr_marker() {
        let mut with_dr = Tokens::new("Actual - H1 DR Premium");
        let mut without_dr = Tokens::new("actual - h1 premium");
        assert_eq!(with_dr.zone_ref().unwrap(), without_dr.zone_ref().unwrap());
    }

    #[test]
    fn test_negated_action_spellings() {
        assert_eq!(Tokens::new("NOT CREATE").action(), Some(Action::NotCreate));
        assert_eq!(Tokens::new("NOT_GET").action(), Some(Action::NotGet));
        assert_eq!(Tokens::new("not_create").action(), Some(Action::NotCreate));
        assert_eq!(Tokens::new("SOMETHING").action(), None);
    }

    #[test]
    fn test_action_probe_consumes_nothing_on_failure() {
        let mut tokens = Tokens::new("NOT BREAK");
        assert_eq!(tokens.action(), None);
        assert_eq!(tokens.break_mode(), Some(BreakMode::NotBreak));
        assert!(tokens.finished());
    }

    #[test]
    fn test_expect_end_names_leftover() {
        let mut tokens = Tokens::new("+ H1 RB EXTRA");
        tokens.element_ref().unwrap();
        let error = tokens.expect_end().unwrap_err();
        assert!(error.message().contains("EXTRA"));
    }
}
