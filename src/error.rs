use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LandscapeError {
    #[error("render surface missing: viewport {width}x{height} has no area")]
    MissingSurface { width: f64, height: f64 },

    #[error("{name} must be within {range}, got {value}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        range: &'static str,
    },

    #[error("unrecognised colour `{0}`")]
    InvalidColor(String),
}

pub type Result<T> = std::result::Result<T, LandscapeError>;

/// Fails with [`LandscapeError::InvalidParameter`] unless `min < value < max`.
pub(crate) fn ensure_open_range(
    name: &'static str,
    value: f64,
    min: f64,
    max: f64,
    range: &'static str,
) -> Result<()> {
    if value.is_finite() && value > min && value < max {
        Ok(())
    } else {
        Err(LandscapeError::InvalidParameter { name, value, range })
    }
}

pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<()> {
    ensure_open_range(name, value, 0.0, f64::INFINITY, "(0, inf)")
}

pub(crate) fn ensure_non_negative(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LandscapeError::InvalidParameter {
            name,
            value,
            range: "[0, inf)",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_range_rejects_bounds() {
        assert!(ensure_open_range("ratio", 0.0, 0.0, 1.0, "(0, 1)").is_err());
        assert!(ensure_open_range("ratio", 1.0, 0.0, 1.0, "(0, 1)").is_err());
        assert!(ensure_open_range("ratio", 0.5, 0.0, 1.0, "(0, 1)").is_ok());
    }

    #[test]
    fn rejects_nan() {
        assert!(ensure_positive("length", f64::NAN).is_err());
        assert!(ensure_non_negative("speed", f64::NAN).is_err());
    }

    #[test]
    fn error_message_names_parameter() {
        let err = ensure_open_range("sub_branches_length", 1.5, 0.0, 1.0, "(0, 1)")
            .expect_err("out of range");
        assert_eq!(
            err.to_string(),
            "sub_branches_length must be within (0, 1), got 1.5"
        );
    }
}
