use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid geometry: {0}")]
    GeometryError(String),
    #[error("Missing field: {0}")]
    MissingField(&'static str),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Malformed payload: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Malformed batch file: {0}")]
    CsvError(#[from] csv::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("No data found")]
    NotFound,
}
