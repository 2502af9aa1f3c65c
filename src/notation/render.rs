//! The sentence compiler: one fixed template per clause variant.
//!
//! Rendering is total — any clause the parsers hand over produces a sentence.

use super::clause::{
    Action, Advantage, BreakMode, Clause, Direction, ElementRef, Level, Qualifier, RangeKind, Side,
    ZoneRef,
};

/// Compiles a parsed clause into its natural-language sentence.
pub fn render(clause: &Clause) -> String {
    match clause {
        Clause::Inside { element, zone } => format!(
            "Цена находится внутри {}. Данный {} находится в отметках {}.",
            element_text(element),
            element.name,
            zone_phrase(zone),
        ),
        Clause::RangeSingle {
            element,
            zone,
            direction,
        } => format!(
            "Цена устанавливает {}. Ближайшая опорная область - {}, расположенный в отметках {}.",
            match direction {
                Direction::Up => "ATH",
                Direction::Down => "ATL",
            },
            element_text(element),
            zone_phrase(zone),
        ),
        Clause::RangeDouble {
            first,
            first_zone,
            second,
            second_zone,
        } => format!(
            "Цена находится в диапазоне между {}, расположенного в отметках {}, \
и {}, расположенного в отметках {}.",
            element_text(first),
            zone_phrase(first_zone),
            element_text(second),
            zone_phrase(second_zone),
        ),
        Clause::Action(action) => {
            let mut sentence = format!(
                "Для перехода к сделке цена должна {}",
                match action.action {
                    Action::Create => format!("сформировать {}", element_text(&action.primary)),
                    Action::NotCreate =>
                        format!("не сформировать {}", element_text(&action.primary)),
                    Action::Get => format!(
                        "получить реакцию от {}",
                        element_text(&action.primary)
                    ),
                    Action::NotGet => format!(
                        "не получить реакцию от {}",
                        element_text(&action.primary)
                    ),
                }
            );
            if let Some(zone) = &action.zone {
                match action.action {
                    Action::Get | Action::NotGet => {
                        sentence.push_str(&format!(
                            ", расположенного в отметке {}",
                            zone_phrase(zone)
                        ));
                    }
                    Action::Create | Action::NotCreate => {
                        sentence.push_str(&format!(" в отметках {}", zone_phrase(zone)));
                    }
                }
            }
            if let Some(with) = &action.with {
                let joint = match with.break_mode {
                    Some(BreakMode::Break) => "с пробоем",
                    Some(BreakMode::NotBreak) => "после реакции от",
                    None => "во взаимодействии с",
                };
                sentence.push_str(&format!(
                    " {} {}, расположенного в отметках {}",
                    joint,
                    element_text(&with.element),
                    zone_phrase(&with.zone)
                ));
            }
            sentence.push('.');
            sentence
        }
        Clause::Meaning(meaning) => format!(
            "Данное ценообразование будет означать {} {} {} {}.",
            match meaning.advantage {
                Advantage::Adv => "преимущество",
                Advantage::NotAdv => "отсутствие преимущества",
            },
            match meaning.side {
                Side::Buy => "покупателей над продавцами",
                Side::Sell => "продавцов над покупателями",
            },
            match meaning.level {
                Level::Up => "выше",
                Level::Low => "ниже",
            },
            match &meaning.qualifier {
                Qualifier::Element(element) => element_text(element),
                Qualifier::Zone(zone) => format!(
                    "{} {} в отметках {}",
                    kind_word(zone.kind),
                    dr_text(zone),
                    zone.zone.name()
                ),
            },
        ),
    }
}

/// `[+H1 RB]`-style reference to an element.
fn element_text(element: &ElementRef) -> String {
    format!(
        "[{}{} {}]",
        element.sign.glyph(),
        element.timeframe,
        element.name
    )
}

/// `[-H4 DR]`-style reference to a trading range.
fn dr_text(zone: &ZoneRef) -> String {
    format!("[{}{} DR]", zone.sign.glyph(), zone.timeframe)
}

fn kind_word(kind: RangeKind) -> &'static str {
    match kind {
        RangeKind::Actual => "актуального",
        RangeKind::Prev => "предыдущего",
    }
}

/// "Premium актуального [-H4 DR]" — zone name, range qualifier, range ref.
fn zone_phrase(zone: &ZoneRef) -> String {
    format!("{} {} {}", zone.zone.name(), kind_word(zone.kind), dr_text(zone))
}
