/// Values forwarded to the order-update request
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::analysis::Measurement;
use crate::tier::PrinterTier;

/// Model size and printer option attached to an order.
///
/// Lengths are millimeters, `volume` is in the measurement's display unit.
/// Every number is rounded to two decimals.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderDimensions {
    pub length: f64,
    pub breadth: f64,
    pub height: f64,
    pub volume: f64,
    pub volume_unit: String,
    pub printer: PrinterTier,
}

impl OrderDimensions {
    pub fn new(measurement: &Measurement, printer: PrinterTier) -> Self {
        let size = measurement.bounding_box.size();
        Self {
            length: round2(f64::from(size.x)),
            breadth: round2(f64::from(size.y)),
            height: round2(f64::from(size.z)),
            volume: round2(measurement.volume),
            volume_unit: measurement.unit.volume_suffix().to_string(),
            printer,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{measure, Unit};
    use crate::geometry::DecodedMesh;

    #[test]
    fn test_lengths_stay_in_millimeters() {
        let m = measure(&DecodedMesh::cube(25.4), Unit::Inch);
        let order = OrderDimensions::new(&m, PrinterTier::Standard);

        assert_eq!(order.length, 25.4);
        assert_eq!(order.breadth, 25.4);
        assert_eq!(order.height, 25.4);
        assert_eq!(order.volume, 1.0);
        assert_eq!(order.volume_unit, "in³");
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.005_1), 1.01);
        assert_eq!(round2(-2.344), -2.34);
        assert_eq!(round2(0.0), 0.0);
    }
}
