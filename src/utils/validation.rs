use crate::utils::error::{Result, SolverError};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(SolverError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(SolverError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(SolverError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_file_extensions(
    field_name: &str,
    files: &[String],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        match std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            Some(extension) if allowed_set.contains(extension) => {}
            Some(extension) => {
                return Err(SolverError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
            None => {
                return Err(SolverError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: "File has no extension or invalid filename".to_string(),
                });
            }
        }
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SolverError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(SolverError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Rejects NaN, infinities and negative values.
pub fn validate_non_negative(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(SolverError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value must be a finite, non-negative number".to_string(),
        });
    }
    Ok(())
}

pub fn validate_length(what: &str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(SolverError::DimensionMismatch {
            what: what.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

/// Checks a `rows x cols` matrix shape and that every cell is finite.
pub fn validate_matrix(what: &str, matrix: &[Vec<f64>], rows: usize, cols: usize) -> Result<()> {
    validate_length(&format!("{} rows", what), rows, matrix.len())?;
    for (i, row) in matrix.iter().enumerate() {
        validate_length(&format!("{} row {}", what, i), cols, row.len())?;
        for (j, &value) in row.iter().enumerate() {
            if !value.is_finite() {
                return Err(SolverError::InvalidCost {
                    row: i,
                    col: j,
                    value,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("max_iterations", 5, 1).is_ok());
        assert!(validate_positive_number("max_iterations", 0, 1).is_err());
    }

    #[test]
    fn test_validate_file_extensions() {
        let files = vec!["scenario.json".to_string(), "scenario.toml".to_string()];
        assert!(validate_file_extensions("input.scenario", &files, &["json", "toml"]).is_ok());

        let invalid_files = vec!["scenario.xlsx".to_string()];
        assert!(
            validate_file_extensions("input.scenario", &invalid_files, &["json", "toml"]).is_err()
        );
    }

    #[test]
    fn test_validate_matrix_reports_ragged_row() {
        let matrix = vec![vec![1.0, 2.0], vec![3.0]];
        let err = validate_matrix("assignment_costs", &matrix, 2, 2).unwrap_err();
        assert!(matches!(
            err,
            SolverError::DimensionMismatch {
                expected: 2,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_validate_matrix_rejects_nan() {
        let matrix = vec![vec![1.0, f64::NAN]];
        assert!(matches!(
            validate_matrix("costs", &matrix, 1, 2),
            Err(SolverError::InvalidCost { row: 0, col: 1, .. })
        ));
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative("disposal_volume", 0.0).is_ok());
        assert!(validate_non_negative("disposal_volume", -1.0).is_err());
        assert!(validate_non_negative("disposal_volume", f64::INFINITY).is_err());
    }
}
