use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid binning for histogram `{name}`: {bins} bins on [{lower}, {upper})")]
    InvalidBinning {
        name: String,
        bins: usize,
        lower: f64,
        upper: f64,
    },

    #[error("Histograms `{0}` and `{1}` have different binning")]
    BinningMismatch(String, String),

    #[error("Line {line}: {msg}")]
    SettingsSyntax { line: usize, msg: String },

    #[error("{}Setting `{key}` = `{value}` is not a valid {kind}", at_line(.line))]
    SettingsValue {
        key: String,
        value: String,
        kind: &'static str,
        line: Option<usize>,
    },

    #[error("Failed to read `{path}`: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unknown event record format: `{0}`")]
    UnknownFormat(PathBuf),

    #[error("Failed to parse event record: {0}")]
    Record(String),

    #[error("Generator initialisation failed: {0}")]
    Initialisation(String),

    #[error("Event generation failed: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn at_line(line: &Option<usize>) -> String {
    line.map(|line| format!("Line {line}: ")).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, Error>;
