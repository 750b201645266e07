use crate::id::NodeId;

/// Result alias used across the Easel crates.
pub type EaselResult<T> = Result<T, EaselError>;

/// Everything that can go wrong while editing or exporting a scene.
///
/// None of these are fatal: a rejected resize keeps the previous drawing
/// area, a failed decode simply adds no node.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EaselError {
    /// A drawing-area update would leave a side at or below the minimum.
    #[error("drawing area {width}x{height} is not larger than the {min} minimum")]
    BelowMinimumSize { width: f64, height: f64, min: f64 },

    /// A mutation referenced a node that is not in the scene.
    #[error("unknown node `{0}`")]
    UnknownNode(NodeId),

    /// Uploaded bytes could not be decoded into a bitmap.
    #[error("decode error: {0}")]
    Decode(String),

    /// The export surface could not be rendered or encoded.
    #[error("export error: {0}")]
    Export(String),

    /// Invalid editor configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl EaselError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_values() {
        let err = EaselError::BelowMinimumSize {
            width: 40.0,
            height: 300.0,
            min: 50.0,
        };
        assert_eq!(
            err.to_string(),
            "drawing area 40x300 is not larger than the 50 minimum"
        );
        assert_eq!(
            EaselError::UnknownNode(NodeId::intern("ghost")).to_string(),
            "unknown node `ghost`"
        );
    }
}
