/// Market direction of an element or range, written `+`/`-` in notation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sign {
    Bullish,
    Bearish,
}

impl Sign {
    /// The glyph used in notation and in rendered references.
    pub fn glyph(&self) -> char {
        match self {
            Sign::Bullish => '+',
            Sign::Bearish => '-',
        }
    }
}

/// Whether a trading range reference points at the current or the previous range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeKind {
    Actual,
    Prev,
}

/// Named sub-region of a trading range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Zone {
    Premium,
    Equilibrium,
    Discount,
}

impl Zone {
    /// Canonical title-case spelling, independent of how the input was cased.
    pub fn name(&self) -> &'static str {
        match self {
            Zone::Premium => "Premium",
            Zone::Equilibrium => "Equilibrium",
            Zone::Discount => "Discount",
        }
    }
}

/// `UP`/`DOWN` marker of the single-element RANGE form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Action keyword of the Transition-Action dialect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Create,
    NotCreate,
    Get,
    NotGet,
}

/// Trailing marker of a `WITH` clause.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BreakMode {
    Break,
    NotBreak,
}

/// `ADV`/`NOT ADV` head of the Transition-Meaning dialect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advantage {
    Adv,
    NotAdv,
}

/// Which side the advantage statement is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

/// Whether the advantage holds above or below the qualifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Up,
    Low,
}

/// A signed, timeframe-qualified market-structure element, e.g. `+ H1 RB`.
///
/// The timeframe is stored in its canonical uppercase spelling; the element
/// name is a free identifier and kept as written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementRef {
    pub sign: Sign,
    pub timeframe: String,
    pub name: String,
}

/// A zone inside a trading range, e.g. `Actual - H4 DR Premium`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZoneRef {
    pub kind: RangeKind,
    pub sign: Sign,
    pub timeframe: String,
    pub zone: Zone,
}

/// Secondary `WITH <element> <zone> [BREAK|NOT BREAK]` clause of an action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WithClause {
    pub element: ElementRef,
    pub zone: ZoneRef,
    pub break_mode: Option<BreakMode>,
}

/// Parsed Transition-Action line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionClause {
    pub action: Action,
    pub primary: ElementRef,
    pub zone: Option<ZoneRef>,
    pub with: Option<WithClause>,
}

/// Qualifier of a meaning statement: either an element or a range zone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Qualifier {
    Element(ElementRef),
    Zone(ZoneRef),
}

/// Parsed Transition-Meaning line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MeaningClause {
    pub advantage: Advantage,
    pub side: Side,
    pub level: Level,
    pub qualifier: Qualifier,
}

/// Fully parsed notation of any dialect.
///
/// A clause is only ever built from input that matched its grammar end to
/// end; partial matches are rejected by the parsers, never truncated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Clause {
    /// `IN <element>` + zone clause: price sits inside the element.
    Inside { element: ElementRef, zone: ZoneRef },
    /// `RANGE <element>` + direction + zone clause: price sets a new extreme.
    RangeSingle {
        element: ElementRef,
        zone: ZoneRef,
        direction: Direction,
    },
    /// `RANGE <element> <element>` + two zone clauses: price sits between both.
    RangeDouble {
        first: ElementRef,
        first_zone: ZoneRef,
        second: ElementRef,
        second_zone: ZoneRef,
    },
    Action(ActionClause),
    Meaning(MeaningClause),
}
