/// Measurement session for the model currently selected in the storefront
///
/// Decodes may run on other threads and finish in any order. Each decode is
/// tagged with a [`DecodeTicket`]; only the ticket from the latest `begin` may
/// write its result back, so the last file selected wins.
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::analysis::{measure, Measurement, Unit};
use crate::config::MeterConfig;
use crate::error::{DecodeError, SessionError};
use crate::geometry::DecodedMesh;
use crate::order::OrderDimensions;
use crate::stl;
use crate::tier::{PrinterSelection, PrinterTier};

/// Generation tag handed out when a file is selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DecodeTicket {
    generation: u64,
}

impl DecodeTicket {
    /// Rebuild a ticket from its raw generation, e.g. after crossing an FFI boundary
    pub fn from_generation(generation: u64) -> Self {
        Self { generation }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Outcome of handing a finished decode back to the session
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// The result belongs to the current selection and is now active.
    Accepted(Measurement),
    /// A newer file was selected; the result was dropped.
    Stale,
}

#[derive(Debug, Default)]
struct SessionState {
    mesh: Option<Arc<DecodedMesh>>,
    accepted_generation: u64,
    unit: Unit,
    printer: PrinterSelection,
}

#[derive(Debug)]
pub struct MeasureSession {
    config: MeterConfig,
    latest: AtomicU64,
    state: Mutex<SessionState>,
}

impl MeasureSession {
    pub fn new(config: MeterConfig) -> Self {
        let state = SessionState {
            unit: config.default_unit,
            ..SessionState::default()
        };
        Self {
            config,
            latest: AtomicU64::new(0),
            state: Mutex::new(state),
        }
    }

    pub fn config(&self) -> &MeterConfig {
        &self.config
    }

    /// Register a newly selected file; every earlier ticket becomes stale
    pub fn begin(&self) -> DecodeTicket {
        // Bumped under the state lock so `finish` never installs a result
        // whose ticket went stale between its check and its write
        let _state = self.lock();
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, "decode started");
        DecodeTicket { generation }
    }

    pub fn is_current(&self, ticket: DecodeTicket) -> bool {
        ticket.generation == self.latest.load(Ordering::SeqCst)
    }

    /// Hand back the result of the decode started with `ticket`.
    ///
    /// Stale results, errors included, are dropped and reported as
    /// [`Completion::Stale`]. A current decode error clears the active model.
    pub fn complete(
        &self,
        ticket: DecodeTicket,
        result: Result<DecodedMesh, DecodeError>,
    ) -> Result<Completion, SessionError> {
        self.finish(ticket, result.map_err(SessionError::from))
    }

    /// Check the upload limit, decode `data` on the calling thread and complete `ticket`.
    ///
    /// An oversize upload on the current ticket clears the active model like a
    /// failed decode does.
    pub fn load_bytes(&self, ticket: DecodeTicket, data: &[u8]) -> Result<Completion, SessionError> {
        if let Err(err) = self.config.check_size(data.len()) {
            return self.finish(ticket, Err(err));
        }
        self.finish(ticket, stl::decode(data).map_err(SessionError::from))
    }

    fn finish(
        &self,
        ticket: DecodeTicket,
        result: Result<DecodedMesh, SessionError>,
    ) -> Result<Completion, SessionError> {
        let mut state = self.lock();

        if !self.is_current(ticket) || ticket.generation <= state.accepted_generation {
            debug!(
                generation = ticket.generation,
                latest = self.latest.load(Ordering::SeqCst),
                "discarding stale decode"
            );
            return Ok(Completion::Stale);
        }

        state.accepted_generation = ticket.generation;
        match result {
            Ok(mesh) => {
                let measurement = measure(&mesh, state.unit);
                state.printer.apply_measurement(measurement.max_dimension_mm);
                state.mesh = Some(Arc::new(mesh));
                debug!(
                    generation = ticket.generation,
                    triangles = measurement.triangle_count,
                    printer = state.printer.tier().code(),
                    "decode accepted"
                );
                Ok(Completion::Accepted(measurement))
            }
            Err(err) => {
                state.mesh = None;
                warn!(generation = ticket.generation, error = %err, "load failed");
                Err(err)
            }
        }
    }

    /// The active model, shared so callers can measure it off the session lock
    pub fn mesh(&self) -> Option<Arc<DecodedMesh>> {
        self.lock().mesh.clone()
    }

    pub fn unit(&self) -> Unit {
        self.lock().unit
    }

    /// Switch the display unit and re-measure.
    ///
    /// Re-measuring re-runs tier selection, so a manual printer choice is lost.
    pub fn set_unit(&self, unit: Unit) -> Option<Measurement> {
        let mut state = self.lock();
        state.unit = unit;
        let measurement = state.mesh.as_deref().map(|mesh| measure(mesh, unit))?;
        state.printer.apply_measurement(measurement.max_dimension_mm);
        Some(measurement)
    }

    /// Measure the active model in the current unit
    pub fn measurement(&self) -> Option<Measurement> {
        let state = self.lock();
        state.mesh.as_deref().map(|mesh| measure(mesh, state.unit))
    }

    /// Measure the active model in another unit without changing the session
    pub fn measure_in(&self, unit: Unit) -> Option<Measurement> {
        self.mesh().map(|mesh| measure(&mesh, unit))
    }

    pub fn printer(&self) -> PrinterTier {
        self.lock().printer.tier()
    }

    pub fn choose_printer(&self, tier: PrinterTier) {
        self.lock().printer.choose(tier);
    }

    /// Payload for the order-update request
    pub fn order_dimensions(&self) -> Result<OrderDimensions, SessionError> {
        let state = self.lock();
        let mesh = state.mesh.as_deref().ok_or(SessionError::NoActiveMesh)?;
        Ok(OrderDimensions::new(
            &measure(mesh, state.unit),
            state.printer.tier(),
        ))
    }

    /// Drop the active model; decodes still in flight become stale
    pub fn clear(&self) {
        let mut state = self.lock();
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        state.mesh = None;
        state.accepted_generation = generation;
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MeasureSession {
    fn default() -> Self {
        Self::new(MeterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_result(side: f32) -> Result<DecodedMesh, DecodeError> {
        Ok(DecodedMesh::cube(side))
    }

    #[test]
    fn test_accepts_current_ticket() {
        let session = MeasureSession::default();
        let ticket = session.begin();

        let m = match session.complete(ticket, cube_result(10.0)).unwrap() {
            Completion::Accepted(m) => m,
            other => panic!("expected accepted, got {other:?}"),
        };
        assert_eq!(m.max_dimension_mm, 10.0);
        assert_eq!(session.printer(), PrinterTier::Standard);
        assert_eq!(session.mesh().map(|m| m.triangle_count()), Some(12));
    }

    #[test]
    fn test_stale_result_finishing_last_is_dropped() {
        let session = MeasureSession::default();
        let first = session.begin();
        let second = session.begin();

        assert!(matches!(
            session.complete(second, cube_result(300.0)),
            Ok(Completion::Accepted(_))
        ));
        assert_eq!(session.complete(first, cube_result(10.0)), Ok(Completion::Stale));

        let m = session.measurement().unwrap();
        assert_eq!(m.max_dimension_mm, 300.0);
        assert_eq!(session.printer(), PrinterTier::Medium);
    }

    #[test]
    fn test_stale_result_finishing_first_is_dropped() {
        let session = MeasureSession::default();
        let first = session.begin();
        let second = session.begin();

        assert_eq!(session.complete(first, cube_result(10.0)), Ok(Completion::Stale));
        assert!(session.mesh().is_none());

        session.complete(second, cube_result(500.0)).unwrap();
        assert_eq!(session.printer(), PrinterTier::Large);
    }

    #[test]
    fn test_stale_error_is_swallowed() {
        let session = MeasureSession::default();
        let first = session.begin();
        let _second = session.begin();
        assert_eq!(
            session.complete(first, Err(DecodeError::UnsupportedFormat)),
            Ok(Completion::Stale)
        );
    }

    #[test]
    fn test_current_error_clears_model() {
        let session = MeasureSession::default();
        let ticket = session.begin();
        session.complete(ticket, cube_result(10.0)).unwrap();

        let ticket = session.begin();
        assert_eq!(
            session.complete(ticket, Err(DecodeError::TruncatedHeader { len: 3 })),
            Err(SessionError::Decode(DecodeError::TruncatedHeader { len: 3 }))
        );
        assert!(session.mesh().is_none());
        assert_eq!(session.order_dimensions(), Err(SessionError::NoActiveMesh));
    }

    #[test]
    fn test_ticket_cannot_complete_twice() {
        let session = MeasureSession::default();
        let ticket = session.begin();
        session.complete(ticket, cube_result(10.0)).unwrap();
        assert_eq!(session.complete(ticket, cube_result(20.0)), Ok(Completion::Stale));
    }

    #[test]
    fn test_unit_change_remeasures_and_resets_printer() {
        let session = MeasureSession::default();
        let ticket = session.begin();
        session.complete(ticket, cube_result(10.0)).unwrap();

        session.choose_printer(PrinterTier::Large);
        assert_eq!(session.printer(), PrinterTier::Large);

        let m = session.set_unit(Unit::Centimeter).unwrap();
        assert_eq!(m.dimensions_text(), "1.00 x 1.00 x 1.00 cm");
        assert_eq!(session.unit(), Unit::Centimeter);
        assert_eq!(session.printer(), PrinterTier::Standard);
    }

    #[test]
    fn test_set_unit_without_model() {
        let session = MeasureSession::default();
        assert!(session.set_unit(Unit::Inch).is_none());
        assert_eq!(session.unit(), Unit::Inch);
    }

    #[test]
    fn test_measure_in_leaves_unit_alone() {
        let session = MeasureSession::default();
        let ticket = session.begin();
        session.complete(ticket, cube_result(10.0)).unwrap();

        let m = session.measure_in(Unit::Inch).unwrap();
        assert_eq!(m.unit, Unit::Inch);
        assert_eq!(session.unit(), Unit::Millimeter);
    }

    #[test]
    fn test_load_bytes_respects_limit() {
        let session = MeasureSession::new(MeterConfig {
            max_upload_bytes: 100,
            ..MeterConfig::default()
        });
        let ticket = session.begin();
        let data = stl::write_binary_stl(&DecodedMesh::cube(1.0));
        assert_eq!(
            session.load_bytes(ticket, &data),
            Err(SessionError::TooLarge {
                size: data.len(),
                limit: 100
            })
        );
    }

    #[test]
    fn test_oversize_upload_clears_previous_model() {
        let session = MeasureSession::new(MeterConfig {
            max_upload_bytes: 700,
            ..MeterConfig::default()
        });
        let ticket = session.begin();
        session.complete(ticket, cube_result(10.0)).unwrap();

        let ticket = session.begin();
        let data = vec![0u8; 784];
        assert_eq!(
            session.load_bytes(ticket, &data),
            Err(SessionError::TooLarge {
                size: 784,
                limit: 700
            })
        );
        assert!(session.mesh().is_none());
        assert_eq!(session.order_dimensions(), Err(SessionError::NoActiveMesh));
    }

    #[test]
    fn test_oversize_upload_on_stale_ticket_is_dropped() {
        let session = MeasureSession::new(MeterConfig {
            max_upload_bytes: 700,
            ..MeterConfig::default()
        });
        let stale = session.begin();
        let current = session.begin();
        session.complete(current, cube_result(10.0)).unwrap();

        assert_eq!(session.load_bytes(stale, &[0u8; 784]), Ok(Completion::Stale));
        assert!(session.mesh().is_some());
    }

    #[test]
    fn test_result_for_superseded_ticket_never_lands() {
        let session = MeasureSession::default();
        let first = session.begin();
        assert!(session.is_current(first));
        let second = session.begin();

        assert_eq!(session.complete(first, cube_result(10.0)), Ok(Completion::Stale));
        assert_eq!(
            session.load_bytes(second, &[0u8; 3]),
            Err(SessionError::Decode(DecodeError::TruncatedHeader { len: 3 }))
        );
        assert!(session.mesh().is_none());
    }

    #[test]
    fn test_load_bytes_decodes() {
        let session = MeasureSession::default();
        let ticket = session.begin();
        let data = stl::write_binary_stl(&DecodedMesh::cube(10.0));
        assert!(matches!(
            session.load_bytes(ticket, &data),
            Ok(Completion::Accepted(_))
        ));
        let order = session.order_dimensions().unwrap();
        assert_eq!(order.length, 10.0);
        assert_eq!(order.volume, 1000.0);
        assert_eq!(order.volume_unit, "cc");
        assert_eq!(order.printer, PrinterTier::Standard);
    }

    #[test]
    fn test_clear_invalidates_in_flight() {
        let session = MeasureSession::default();
        let ticket = session.begin();
        session.clear();
        assert_eq!(session.complete(ticket, cube_result(10.0)), Ok(Completion::Stale));
        assert!(session.mesh().is_none());
    }

    #[test]
    fn test_default_unit_from_config() {
        let session = MeasureSession::new(MeterConfig {
            default_unit: Unit::Inch,
            ..MeterConfig::default()
        });
        assert_eq!(session.unit(), Unit::Inch);
    }
}
