//! Pre-flight checks on user input

use thiserror::Error;

pub const MIN_INPUT_CHARS: usize = 3;
pub const MAX_INPUT_CHARS: usize = 5000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter some text to generate content")]
    Empty,
    #[error("Input is too short ({len} characters, minimum {MIN_INPUT_CHARS})")]
    TooShort { len: usize },
    #[error("Input is too long ({len} characters, maximum {MAX_INPUT_CHARS})")]
    TooLong { len: usize },
}

/// Returns the trimmed input when its length is within bounds.
pub fn validate_input(text: &str) -> Result<&str, ValidationError> {
    let trimmed = text.trim();
    let len = trimmed.chars().count();

    match len {
        0 => Err(ValidationError::Empty),
        n if n < MIN_INPUT_CHARS => Err(ValidationError::TooShort { len: n }),
        n if n > MAX_INPUT_CHARS => Err(ValidationError::TooLong { len: n }),
        _ => Ok(trimmed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_whitespace() {
        assert_eq!(validate_input(""), Err(ValidationError::Empty));
        assert_eq!(validate_input("  \n\t "), Err(ValidationError::Empty));
    }

    #[test]
    fn test_bounds() {
        assert_eq!(validate_input("ab"), Err(ValidationError::TooShort { len: 2 }));
        assert_eq!(validate_input("abc"), Ok("abc"));
        assert_eq!(validate_input(&"x".repeat(5000)).map(str::len), Ok(5000));
        assert_eq!(
            validate_input(&"x".repeat(5001)),
            Err(ValidationError::TooLong { len: 5001 })
        );
    }

    #[test]
    fn test_length_is_measured_after_trim() {
        assert_eq!(validate_input("   ab   "), Err(ValidationError::TooShort { len: 2 }));
        assert_eq!(validate_input("  hello world \n"), Ok("hello world"));
        let padded = format!("  {}  ", "y".repeat(5000));
        assert!(validate_input(&padded).is_ok());
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // three characters, nine bytes
        assert_eq!(validate_input("日本語"), Ok("日本語"));
        assert!(validate_input(&"é".repeat(5000)).is_ok());
    }

    #[test]
    fn test_messages_are_readable() {
        assert!(ValidationError::TooShort { len: 1 }.to_string().contains("minimum 3"));
        assert!(ValidationError::TooLong { len: 6000 }.to_string().contains("maximum 5000"));
    }
}
