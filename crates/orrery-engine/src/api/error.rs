use thiserror::Error;

use crate::renderer::traits::ResourceHandle;

/// Rejected orbital parameters. Raised at construction so no body ever
/// carries elements that would later evaluate to NaN.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum OrbitError {
    #[error("eccentricity {0} is outside [0, 1)")]
    Eccentricity(f64),
    #[error("semi-major axis {0} must be positive")]
    SemiMajorAxis(f64),
    #[error("mean radius {0} must not be negative")]
    Radius(f64),
    #[error("{0} is not a finite number")]
    NonFinite(&'static str),
}

/// Failures while assembling the scene from its catalog and configuration.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("body `{name}` has invalid orbital elements")]
    InvalidBody {
        name: String,
        #[source]
        source: OrbitError,
    },
    #[error("body `{child}` orbits unknown parent `{parent}`")]
    UnknownParent { child: String, parent: String },
    #[error("invalid scene configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// GPU resource release failure reported by a render backend.
/// Callers log it and move on; the owning entity is gone either way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    #[error("resource {0:?} is not tracked by the backend")]
    UnknownHandle(ResourceHandle),
    #[error("backend refused to release resource: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn invalid_body_keeps_source() {
        let err = SceneError::InvalidBody {
            name: "Icarus".into(),
            source: OrbitError::Eccentricity(1.2),
        };
        assert!(err.to_string().contains("Icarus"));
        let source = err.source().map(|s| s.to_string()).unwrap_or_default();
        assert!(source.contains("1.2"));
    }

    #[test]
    fn config_error_converts_from_serde() {
        let bad = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: SceneError = bad.into();
        assert!(matches!(err, SceneError::Config(_)));
    }
}
