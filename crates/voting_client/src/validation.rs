//! Advisory input checks run before a creation request is sent. The backend
//! validates again.

use thiserror::Error;

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;
pub const MEMBER_NAME_MAX_CHARS: usize = 100;
pub const CPF_DIGITS: usize = 11;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("CPF must have 11 digits")]
    InvalidCpf { digits: usize },
}

/// Trims `value` and checks it is non-blank and within `max` characters.
pub fn required_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field });
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_string())
}

pub fn normalize_cpf(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Digits-only CPF if the input holds exactly eleven digits.
pub fn validate_cpf(raw: &str) -> Result<String, ValidationError> {
    let digits = normalize_cpf(raw);
    if digits.len() == CPF_DIGITS {
        Ok(digits)
    } else {
        Err(ValidationError::InvalidCpf {
            digits: digits.len(),
        })
    }
}

/// Progressive `NNN.NNN.NNN-NN` mask; partial input is partially formatted
/// and digits past the eleventh are dropped.
pub fn format_cpf(raw: &str) -> String {
    let digits: Vec<char> = raw
        .chars()
        .filter(char::is_ascii_digit)
        .take(CPF_DIGITS)
        .collect();

    let mut out = String::with_capacity(14);
    for (index, digit) in digits.iter().enumerate() {
        match index {
            3 | 6 => out.push('.'),
            9 => out.push('-'),
            _ => {}
        }
        out.push(*digit);
    }
    out
}
