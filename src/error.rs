use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlanError>;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("An IO operation failed: {0}")]
    IO(#[from] std::io::Error),
    #[error("Failed to load config file: {0}")]
    ConfigLoad(#[from] confy::ConfyError),
    #[error("Ошибка нотации: {0}")]
    Notation(#[from] crate::notation::GrammarError),
    #[error("{0}")]
    Validation(String),
}
