//! Errors raised by map viewport collaborators.

use thiserror::Error;

use super::ViewportId;

/// Errors a [`MapViewport`](super::MapViewport) implementation can report.
///
/// The synchronization core never translates or swallows these; they travel
/// back to whoever triggered the camera change.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewportError {
    /// A camera field is not finite or outside its projectable range.
    #[error("Invalid camera {field}: {value}")]
    InvalidCamera { field: &'static str, value: f64 },

    /// The viewport has no rendering surface yet.
    #[error("{0} is not ready (no rendering surface attached)")]
    NotReady(ViewportId),

    /// No overlay source with the given name exists.
    #[error("Missing overlay source: {0}")]
    MissingSource(String),

    /// The overlay source refused the payload.
    #[error("Overlay source {name} rejected data: {reason}")]
    SourceRejected { name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_camera_display() {
        let err = ViewportError::InvalidCamera {
            field: "zoom",
            value: f64::INFINITY,
        };
        assert_eq!(err.to_string(), "Invalid camera zoom: inf");
    }

    #[test]
    fn test_source_errors_display() {
        let err = ViewportError::MissingSource("bbox".to_string());
        assert_eq!(err.to_string(), "Missing overlay source: bbox");

        let err = ViewportError::SourceRejected {
            name: "viewBounds".to_string(),
            reason: "duplicate".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Overlay source viewBounds rejected data: duplicate"
        );
    }
}
