use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("No usable font: {0}")]
    FontUnavailable(String),

    #[error("Drawing failed: {0}")]
    Drawing(String),

    #[error("Nothing to plot")]
    EmptyData,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Flatten plotters' backend-generic errors into a message.
pub(crate) fn drawing<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Drawing(e.to_string())
}
