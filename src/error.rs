//! Crate error types.
//!
//! Gameplay systems never fail a frame: optional effects are skipped instead.
//! Errors surface where configuration is checked, so a bad
//! `assets/zynaps.toml` is reported once at startup and the compiled
//! defaults stay in effect.

use std::fmt;

/// Top-level error enum.
#[derive(Debug, Clone, PartialEq)]
pub enum ZynapsError {
    /// A socket name referenced by the configuration is not defined on the mesh.
    UnknownSocket {
        /// Which configuration field referenced the socket.
        role: &'static str,
        /// The name that failed to resolve.
        name: String,
    },

    /// A `[min, max]` range is inverted, or empty where a span is required.
    InvalidRange {
        name: &'static str,
        min: f32,
        max: f32,
    },

    /// The hull polygon has too few vertices to be triangulated.
    DegenerateHull {
        /// Vertices supplied.
        got: usize,
    },

    /// A size or speed that must be strictly positive is not.
    NonPositive { name: &'static str, value: f32 },

    /// The configuration file could not be parsed.
    Parse(String),
}

impl fmt::Display for ZynapsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZynapsError::UnknownSocket { role, name } => {
                write!(f, "{role} refers to unknown socket '{name}'")
            }
            ZynapsError::InvalidRange { name, min, max } => {
                write!(f, "range '{name}' is invalid: min {min}, max {max}")
            }
            ZynapsError::DegenerateHull { got } => {
                write!(f, "ship hull needs at least 3 vertices, got {got}")
            }
            ZynapsError::NonPositive { name, value } => {
                write!(f, "'{name}' must be greater than zero, got {value}")
            }
            ZynapsError::Parse(msg) => write!(f, "config parse error: {msg}"),
        }
    }
}

impl std::error::Error for ZynapsError {}

impl From<toml::de::Error> for ZynapsError {
    fn from(err: toml::de::Error) -> Self {
        ZynapsError::Parse(err.to_string())
    }
}

/// Convenience alias: a `Result` using `ZynapsError` as the error type.
pub type ZynapsResult<T> = Result<T, ZynapsError>;

/// Returns an error unless `min < max`.
pub fn validate_range(name: &'static str, min: f32, max: f32) -> ZynapsResult<()> {
    if min < max {
        Ok(())
    } else {
        Err(ZynapsError::InvalidRange { name, min, max })
    }
}

/// Returns an error unless `min <= max`.  A collapsed range is one value.
pub fn validate_inclusive_range(name: &'static str, min: f32, max: f32) -> ZynapsResult<()> {
    if min <= max {
        Ok(())
    } else {
        Err(ZynapsError::InvalidRange { name, min, max })
    }
}

/// Returns an error unless `value > 0`.
pub fn validate_positive(name: &'static str, value: f32) -> ZynapsResult<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ZynapsError::NonPositive { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_range_is_rejected() {
        assert_eq!(
            validate_range("glow", 1.0, 0.0),
            Err(ZynapsError::InvalidRange {
                name: "glow",
                min: 1.0,
                max: 0.0
            })
        );
        assert!(validate_range("glow", 0.0, 1.0).is_ok());
        assert!(validate_range("glow", 0.5, 0.5).is_err());
    }

    #[test]
    fn inclusive_range_accepts_a_single_value() {
        assert!(validate_inclusive_range("hazard_speed", 120.0, 120.0).is_ok());
        assert!(validate_inclusive_range("hazard_speed", 120.0, 119.0).is_err());
    }

    #[test]
    fn display_names_the_socket() {
        let err = ZynapsError::UnknownSocket {
            role: "right_cannon_socket",
            name: "gun".into(),
        };
        assert_eq!(
            err.to_string(),
            "right_cannon_socket refers to unknown socket 'gun'"
        );
    }
}
