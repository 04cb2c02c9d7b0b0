/// Error types for decoding and measurement sessions
use thiserror::Error;

/// Reasons a byte buffer could not be decoded as binary STL.
///
/// A failed decode never yields a partial mesh.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Fewer than 84 bytes, so neither the header nor the triangle count is present.
    #[error("truncated STL header: need 84 bytes, got {len}")]
    TruncatedHeader { len: usize },

    /// The declared triangle count needs more bytes than the buffer holds.
    #[error("truncated STL body: {declared} triangles need {expected_len} bytes, got {actual_len}")]
    TruncatedBody {
        declared: u32,
        expected_len: u64,
        actual_len: usize,
    },

    /// Input looks like ASCII STL, which is not decoded.
    #[error("unsupported STL format: ASCII STL is not supported")]
    UnsupportedFormat,
}

/// Errors raised by a [`MeasureSession`](crate::session::MeasureSession).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("file is {size} bytes, upload limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    #[error("no model has been loaded")]
    NoActiveMesh,
}

/// A unit or printer code that is not part of the closed set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}
