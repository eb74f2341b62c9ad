//! Result type alias
//!
//! This module provides a convenient Result type alias that uses `CellImportError`
//! as the error type.

use super::errors::CellImportError;

/// Result type alias for pipeline operations
///
/// # Examples
///
/// ```
/// use cell_import::domain::result::Result;
/// use cell_import::domain::errors::CellImportError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(CellImportError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, CellImportError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::CellImportError;

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(CellImportError::Validation("test error".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
