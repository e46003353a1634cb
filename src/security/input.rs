use thiserror::Error;

use crate::reporting::{Classify, ErrorKind};

/// Sequences rejected by [`validate_input`] and stripped by [`sanitize_input`].
pub const FORBIDDEN_SEQUENCES: [&str; 2] = [";", "--"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Input contains forbidden sequence {sequence:?}")]
    ForbiddenSequence { sequence: &'static str },
    #[error("Input is empty")]
    Empty,
}

impl Classify for ValidationError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::ValidationError
    }
}

pub fn validate_input(input: &str) -> bool {
    require_valid(input).is_ok()
}

/// Like [`validate_input`], naming the first offending sequence.
pub fn require_valid(input: &str) -> Result<(), ValidationError> {
    match FORBIDDEN_SEQUENCES.iter().find(|seq| input.contains(*seq)) {
        Some(&sequence) => Err(ValidationError::ForbiddenSequence { sequence }),
        None => Ok(()),
    }
}

/// Remove every forbidden sequence. `;` is stripped before `--`.
pub fn sanitize_input(input: &str) -> String {
    FORBIDDEN_SEQUENCES
        .iter()
        .fold(input.to_string(), |acc, seq| acc.replace(seq, ""))
}
