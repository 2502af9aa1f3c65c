use std::{fs, path, process};

use clap::{Parser, Subcommand, ValueEnum};

use planbench::entries::{DealEntry, SituationBlock, TransitionEntry};
use planbench::notation::{self, Dialect};
use planbench::plan::{self, Plan};
use planbench::{Config, Result};

#[derive(Parser)]
#[command(name = "planbench", version, about = "Проверка и перевод торговых планов.")]
struct Arguments {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Перевести нотацию в текст. Каждый аргумент - одна строка нотации.
    Translate {
        #[arg(value_enum)]
        dialect: DialectArg,
        lines: Vec<String>,
    },
    /// Разобрать файл плана и проверить все блоки.
    Check { file: path::PathBuf },
    /// Привести файл плана к каноническому шаблону и вывести результат.
    Normalize {
        file: path::PathBuf,
        #[arg(long)]
        title: Option<String>,
    },
    /// Заменить заголовок файла плана и вывести результат.
    Retitle { file: path::PathBuf, title: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum DialectArg {
    /// Двухстрочная нотация текущей ситуации.
    Range,
    /// Нотация действия сценария перехода.
    Action,
    /// Нотация значения сценария перехода.
    Meaning,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Range => Dialect::Range,
            DialectArg::Action => Dialect::TransitionAction,
            DialectArg::Meaning => Dialect::TransitionMeaning,
        }
    }
}

fn main() -> Result<()> {
    let arguments = Arguments::parse();

    // A broken config file must not block a text tool; fall back to defaults.
    let config = match Config::load() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{error}");
            Config::default()
        }
    };

    match arguments.command {
        Command::Translate { dialect, lines } => {
            match notation::translate(dialect.into(), &lines.join("\n")) {
                Ok(sentence) => println!("{sentence}"),
                Err(error) => {
                    eprintln!("Ошибка нотации: {error}");
                    process::exit(1);
                }
            }
        }
        Command::Check { file } => {
            let text = fs::read_to_string(&file)?;
            let plan = Plan::from_markdown(&text, &config.fallback_title);
            if !check(&plan) {
                process::exit(1);
            }
        }
        Command::Normalize { file, title } => {
            let text = fs::read_to_string(&file)?;
            let parsed = Plan::from_markdown(&text, &config.fallback_title);
            let normalized = if parsed.structured {
                parsed
            } else {
                let title = title.as_deref().unwrap_or(&parsed.title);
                Plan::normalize_raw(&parsed.raw_markdown, title)
            };
            print!("{}", normalized.to_markdown());
        }
        Command::Retitle { file, title } => {
            let text = fs::read_to_string(&file)?;
            print!("{}", plan::apply_title_to_markdown(&text, &title));
        }
    }

    Ok(())
}

/// Prints a report for every block of the plan; returns whether it is clean.
fn check(plan: &Plan) -> bool {
    println!("# {}", plan.title);

    if !plan.structured {
        println!("Документ не соответствует шаблону и хранится как есть.");
        println!("Команда `normalize` перенесёт его содержимое в раздел 1.");
        return false;
    }

    let mut clean = true;

    let situation = SituationBlock::parse(&plan.situation);
    println!("\n## {}", plan::SECTION_HEADINGS[0]);
    println!("Картинок: {}", situation.images.len());
    match situation.validate() {
        Ok(()) => {
            // validate already guarantees the notation translates
            if let Ok(sentence) = notation::translate(Dialect::Range, situation.notation.trim()) {
                println!("{sentence}");
            }
        }
        Err(error) => {
            println!("{error}");
            clean = false;
        }
    }

    let transitions = TransitionEntry::parse_all(&plan.transitions);
    println!("\n## {}", plan::SECTION_HEADINGS[1]);
    println!("Сценариев: {}", transitions.len());
    match TransitionEntry::validate_all(&transitions) {
        Ok(()) => {
            for entry in &transitions {
                for (dialect, text) in [
                    (Dialect::TransitionAction, &entry.notation),
                    (Dialect::TransitionMeaning, &entry.meaning_notation),
                ] {
                    if let Ok(sentence) = notation::translate(dialect, text.trim()) {
                        println!("{sentence}");
                    }
                }
            }
        }
        Err(error) => {
            println!("{error}");
            clean = false;
        }
    }

    let deals = DealEntry::parse_all(&plan.deals);
    println!("\n## {}", plan::SECTION_HEADINGS[2]);
    println!("Сделок: {}", deals.len());
    if let Err(error) = DealEntry::validate_all(&deals) {
        println!("{error}");
        clean = false;
    }

    clean
}
