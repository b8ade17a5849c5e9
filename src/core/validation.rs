//! Input validation helpers.
//!
//! These checks guard the public entry points. They fail fast with
//! [`PanopticError::InvalidInput`] or a shape mismatch error and never retry.

use crate::core::errors::PanopticError;

/// Ensures a batch is not empty.
pub fn validate_non_empty<T>(items: &[T], context: &str) -> Result<(), PanopticError> {
    if items.is_empty() {
        return Err(PanopticError::invalid_input(format!(
            "{context}: batch must contain at least one item"
        )));
    }
    Ok(())
}

/// Ensures two parallel sequences have the same length.
pub fn validate_same_length(
    left: usize,
    right: usize,
    left_name: &str,
    right_name: &str,
) -> Result<(), PanopticError> {
    if left != right {
        return Err(PanopticError::invalid_input(format!(
            "{left_name} and {right_name} length mismatch: {left} vs {right}"
        )));
    }
    Ok(())
}

/// Ensures both dimensions of an image or plane are non-zero.
pub fn validate_positive_dimensions(
    width: usize,
    height: usize,
    context: &str,
) -> Result<(), PanopticError> {
    if width == 0 || height == 0 {
        return Err(PanopticError::invalid_input(format!(
            "{context}: dimensions must be positive, got {width}x{height}"
        )));
    }
    Ok(())
}

/// Ensures a tensor has exactly the expected shape.
pub fn validate_tensor_shape(
    actual: &[usize],
    expected: &[usize],
    operation: &str,
    context: &str,
) -> Result<(), PanopticError> {
    if actual != expected {
        return Err(PanopticError::shape_mismatch(
            operation, expected, actual, context,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_non_empty() {
        let empty: Vec<u8> = Vec::new();
        assert!(validate_non_empty(&empty, "images").is_err());
        assert!(validate_non_empty(&[1u8], "images").is_ok());
    }

    #[test]
    fn test_validate_same_length() {
        assert!(validate_same_length(2, 2, "masks", "labels").is_ok());
        let err = validate_same_length(2, 3, "masks", "labels").unwrap_err();
        assert!(err.to_string().contains("masks and labels length mismatch"));
    }

    #[test]
    fn test_validate_positive_dimensions() {
        assert!(validate_positive_dimensions(1, 1, "image").is_ok());
        assert!(validate_positive_dimensions(0, 4, "image").is_err());
        assert!(validate_positive_dimensions(4, 0, "image").is_err());
    }

    #[test]
    fn test_validate_tensor_shape() {
        assert!(validate_tensor_shape(&[2, 3], &[2, 3], "op", "ctx").is_ok());
        assert!(matches!(
            validate_tensor_shape(&[2, 4], &[2, 3], "op", "ctx"),
            Err(PanopticError::TensorOperation { .. })
        ));
    }
}
