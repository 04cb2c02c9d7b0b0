/// Printer tier selection from a model's longest dimension
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::UnknownVariant;

/// Largest dimension (mm) printed on the standard bed, inclusive
pub const STANDARD_MAX_MM: f32 = 200.0;
/// Largest dimension (mm) printed on the medium bed, inclusive
pub const MEDIUM_MAX_MM: f32 = 400.0;

/// Build-volume class of the printer a model is routed to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PrinterTier {
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "STD"))]
    Standard,
    #[cfg_attr(feature = "serde", serde(rename = "MED"))]
    Medium,
    #[cfg_attr(feature = "serde", serde(rename = "LRG"))]
    Large,
}

impl PrinterTier {
    /// Printer option code understood by the order backend
    pub const fn code(self) -> &'static str {
        match self {
            PrinterTier::Standard => "STD",
            PrinterTier::Medium => "MED",
            PrinterTier::Large => "LRG",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            PrinterTier::Standard => "Standard",
            PrinterTier::Medium => "Medium",
            PrinterTier::Large => "Large",
        }
    }
}

impl fmt::Display for PrinterTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PrinterTier {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "STD" => Ok(PrinterTier::Standard),
            "MED" => Ok(PrinterTier::Medium),
            "LRG" => Ok(PrinterTier::Large),
            other => Err(UnknownVariant::new("printer option", other)),
        }
    }
}

/// Classify a longest dimension given in millimeters.
///
/// Upper bounds are inclusive: exactly 200 mm is `Standard`, exactly 400 mm is
/// `Medium`. NaN fails both comparisons and lands in `Large`.
pub fn select_tier(max_dimension_mm: f32) -> PrinterTier {
    if max_dimension_mm <= STANDARD_MAX_MM {
        PrinterTier::Standard
    } else if max_dimension_mm <= MEDIUM_MAX_MM {
        PrinterTier::Medium
    } else {
        PrinterTier::Large
    }
}

/// Where the current tier came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    Automatic,
    Manual,
}

/// The printer tier attached to the order being configured.
///
/// A manual choice holds only until the next measurement; every
/// measurement replaces it with the auto-selected tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrinterSelection {
    tier: PrinterTier,
    source: SelectionSource,
}

impl PrinterSelection {
    pub fn new() -> Self {
        Self {
            tier: PrinterTier::Standard,
            source: SelectionSource::Automatic,
        }
    }

    pub fn tier(&self) -> PrinterTier {
        self.tier
    }

    pub fn source(&self) -> SelectionSource {
        self.source
    }

    pub fn choose(&mut self, tier: PrinterTier) {
        self.tier = tier;
        self.source = SelectionSource::Manual;
    }

    /// Re-select from a fresh measurement, overriding any manual choice
    pub fn apply_measurement(&mut self, max_dimension_mm: f32) -> PrinterTier {
        self.tier = select_tier(max_dimension_mm);
        self.source = SelectionSource::Automatic;
        self.tier
    }
}

impl Default for PrinterSelection {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries() {
        assert_eq!(select_tier(0.0), PrinterTier::Standard);
        assert_eq!(select_tier(10.0), PrinterTier::Standard);
        assert_eq!(select_tier(200.0), PrinterTier::Standard);
        assert_eq!(select_tier(200.0001), PrinterTier::Medium);
        assert_eq!(select_tier(400.0), PrinterTier::Medium);
        assert_eq!(select_tier(400.0001), PrinterTier::Large);
        assert_eq!(select_tier(5000.0), PrinterTier::Large);
    }

    #[test]
    fn test_nan_is_large() {
        assert_eq!(select_tier(f32::NAN), PrinterTier::Large);
    }

    #[test]
    fn test_codes_round_trip() {
        for tier in [PrinterTier::Standard, PrinterTier::Medium, PrinterTier::Large] {
            assert_eq!(tier.code().parse::<PrinterTier>(), Ok(tier));
        }
        assert!("Fastest".parse::<PrinterTier>().is_err());
        assert_eq!(PrinterTier::Medium.to_string(), "Medium");
    }

    #[test]
    fn test_measurement_overrides_manual_choice() {
        let mut selection = PrinterSelection::new();
        selection.choose(PrinterTier::Large);
        assert_eq!(selection.source(), SelectionSource::Manual);

        assert_eq!(selection.apply_measurement(150.0), PrinterTier::Standard);
        assert_eq!(selection.tier(), PrinterTier::Standard);
        assert_eq!(selection.source(), SelectionSource::Automatic);
    }
}
