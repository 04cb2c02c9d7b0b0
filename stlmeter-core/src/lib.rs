/// stlmeter Core Library - STL decoding and model measurement
///
/// Decodes binary STL uploads, measures bounding dimensions and enclosed
/// volume, and picks the printer tier a model is routed to.

pub mod analysis;
pub mod config;
pub mod error;
pub mod geometry;
pub mod order;
pub mod session;
pub mod stl;
pub mod tier;

// Re-export commonly used types
pub use analysis::{Measurement, Unit};
pub use config::MeterConfig;
pub use error::{DecodeError, SessionError};
pub use geometry::{BoundingBox, DecodedMesh, Triangle};
pub use order::OrderDimensions;
pub use session::{Completion, DecodeTicket, MeasureSession};
pub use tier::{select_tier, PrinterSelection, PrinterTier};

/// Decode a binary STL buffer and measure it in `unit`
pub fn measure_stl(data: &[u8], unit: Unit) -> Result<Measurement, DecodeError> {
    let mesh = stl::decode(data)?;
    Ok(analysis::measure(&mesh, unit))
}
