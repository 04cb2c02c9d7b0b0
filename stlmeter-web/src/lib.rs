/// stlmeter Web - WASM bindings for the storefront's model preview
///
/// The page reads the selected file asynchronously. Call `begin_load` when a
/// file is picked and pass the returned generation to `finish_load` with the
/// bytes; results for files that were replaced in the meantime are ignored.

use stlmeter_core::{Completion, DecodeTicket, MeasureSession, MeterConfig, PrinterTier, Unit};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct StlMeter {
    session: MeasureSession,
}

#[wasm_bindgen]
impl StlMeter {
    #[wasm_bindgen(constructor)]
    pub fn new() -> StlMeter {
        StlMeter {
            session: MeasureSession::new(MeterConfig::default()),
        }
    }

    /// Register a newly selected file and return its generation
    pub fn begin_load(&self) -> u64 {
        self.session.begin().generation()
    }

    /// Decode the bytes of the file registered as `generation`.
    ///
    /// Returns `false` when a newer file has been selected since.
    pub fn finish_load(&self, generation: u64, bytes: &[u8]) -> Result<bool, JsValue> {
        let ticket = DecodeTicket::from_generation(generation);
        match self.session.load_bytes(ticket, bytes) {
            Ok(Completion::Accepted(_)) => Ok(true),
            Ok(Completion::Stale) => Ok(false),
            Err(err) => {
                #[cfg(target_arch = "wasm32")]
                web_sys::console::warn_1(&JsValue::from_str(&format!("stlmeter: {err}")));
                Err(JsValue::from_str(&err.to_string()))
            }
        }
    }

    /// Select `mm`, `cm` or `in`; anything else selects millimeters
    pub fn set_unit(&self, unit: &str) {
        self.session.set_unit(Unit::from_symbol_lossy(unit));
    }

    pub fn unit(&self) -> String {
        self.session.unit().symbol().to_string()
    }

    pub fn dimensions_text(&self) -> Option<String> {
        self.session.measurement().map(|m| m.dimensions_text())
    }

    pub fn volume_text(&self) -> Option<String> {
        self.session.measurement().map(|m| m.volume_text())
    }

    pub fn triangle_count(&self) -> usize {
        self.session.mesh().map_or(0, |mesh| mesh.triangle_count())
    }

    /// Printer option code (`STD`, `MED` or `LRG`)
    pub fn printer_code(&self) -> String {
        self.session.printer().code().to_string()
    }

    pub fn choose_printer(&self, code: &str) -> Result<(), JsValue> {
        let tier: PrinterTier = code
            .parse()
            .map_err(|err: stlmeter_core::error::UnknownVariant| JsValue::from_str(&err.to_string()))?;
        self.session.choose_printer(tier);
        Ok(())
    }

    /// Order-update payload as JSON
    pub fn order_json(&self) -> Result<String, JsValue> {
        let order = self
            .session
            .order_dimensions()
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        serde_json::to_string(&order).map_err(|err| JsValue::from_str(&err.to_string()))
    }

    pub fn clear(&self) {
        self.session.clear();
    }
}

impl Default for StlMeter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stlmeter_core::{stl, DecodedMesh};

    // Only success paths: building a JsValue needs a wasm host.

    #[test]
    fn test_load_and_measure() {
        let meter = StlMeter::new();
        let generation = meter.begin_load();
        let bytes = stl::write_binary_stl(&DecodedMesh::cube(10.0));

        assert_eq!(meter.finish_load(generation, &bytes).ok(), Some(true));
        assert_eq!(meter.triangle_count(), 12);
        assert_eq!(meter.dimensions_text().as_deref(), Some("10.00 x 10.00 x 10.00 mm"));
        assert_eq!(meter.printer_code(), "STD");

        meter.set_unit("cm");
        assert_eq!(meter.unit(), "cm");
        assert_eq!(meter.volume_text().as_deref(), Some("1.00 cm³"));

        meter.set_unit("furlong");
        assert_eq!(meter.unit(), "mm");
    }

    #[test]
    fn test_replaced_file_is_ignored() {
        let meter = StlMeter::new();
        let first = meter.begin_load();
        let second = meter.begin_load();
        let small = stl::write_binary_stl(&DecodedMesh::cube(10.0));
        let large = stl::write_binary_stl(&DecodedMesh::cube(401.0));

        assert_eq!(meter.finish_load(second, &large).ok(), Some(true));
        assert_eq!(meter.finish_load(first, &small).ok(), Some(false));
        assert_eq!(meter.printer_code(), "LRG");
    }

    #[test]
    fn test_order_json() {
        let meter = StlMeter::new();
        let generation = meter.begin_load();
        let bytes = stl::write_binary_stl(&DecodedMesh::cube(250.0));
        meter.finish_load(generation, &bytes).ok();

        let json = meter.order_json().ok().unwrap_or_default();
        assert!(json.contains("\"printer\":\"MED\""));
        assert!(json.contains("\"length\":250.0"));
    }

    #[test]
    fn test_clear() {
        let meter = StlMeter::new();
        let generation = meter.begin_load();
        meter.clear();
        let bytes = stl::write_binary_stl(&DecodedMesh::cube(10.0));
        assert_eq!(meter.finish_load(generation, &bytes).ok(), Some(false));
        assert_eq!(meter.dimensions_text(), None);
    }
}
