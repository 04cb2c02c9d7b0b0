/// Bounding box, volume and unit conversion for decoded meshes
use std::fmt;
use std::str::FromStr;

use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::UnknownVariant;
use crate::geometry::{BoundingBox, DecodedMesh};

/// Display unit for dimensions and volume.
///
/// Mesh coordinates are always millimeters; a unit only scales the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Unit {
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "mm"))]
    Millimeter,
    #[cfg_attr(feature = "serde", serde(rename = "cm"))]
    Centimeter,
    #[cfg_attr(feature = "serde", serde(rename = "in"))]
    Inch,
}

impl Unit {
    pub const ALL: [Unit; 3] = [Unit::Millimeter, Unit::Centimeter, Unit::Inch];

    /// Multiplier from millimeters
    pub const fn factor(self) -> f64 {
        match self {
            Unit::Millimeter => 1.0,
            Unit::Centimeter => 0.1,
            Unit::Inch => 0.0393701,
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Unit::Millimeter => "mm",
            Unit::Centimeter => "cm",
            Unit::Inch => "in",
        }
    }

    /// Suffix printed after a volume in this unit.
    ///
    /// Millimeter volumes are labelled `cc` as the storefront always has.
    pub const fn volume_suffix(self) -> &'static str {
        match self {
            Unit::Millimeter => "cc",
            Unit::Centimeter => "cm³",
            Unit::Inch => "in³",
        }
    }

    /// Parse a unit symbol, falling back to millimeters for anything unknown
    pub fn from_symbol_lossy(symbol: &str) -> Self {
        symbol.parse().unwrap_or_default()
    }
}

impl FromStr for Unit {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "mm" => Ok(Unit::Millimeter),
            "cm" => Ok(Unit::Centimeter),
            "in" => Ok(Unit::Inch),
            other => Err(UnknownVariant::new("unit", other)),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Component-wise extrema over every vertex of every triangle
pub fn bounding_box(mesh: &DecodedMesh) -> BoundingBox {
    let mut bbox = BoundingBox::empty();
    for vertex in mesh.vertices() {
        bbox.expand_to_include(vertex);
    }
    bbox
}

/// Sum of signed tetrahedron volumes against the origin, in mm³.
///
/// Positive for a closed mesh wound outward, negative when inside-out.
/// Accumulates in `f64` in file order.
pub fn signed_volume(mesh: &DecodedMesh) -> f64 {
    let mut total = 0.0f64;

    for triangle in &mesh.triangles {
        let [a, b, c] = triangle.vertices.map(|v| v.coords.map(f64::from));
        total += a.dot(&b.cross(&c)) / 6.0;
    }

    total
}

/// Enclosed volume in mm³.
///
/// Only meaningful for closed, consistently wound meshes. Open or mixed-winding
/// meshes give a number, not an error.
pub fn volume(mesh: &DecodedMesh) -> f64 {
    signed_volume(mesh).abs()
}

/// Bounding box extents converted to `unit`
pub fn scale_to_unit(bbox: &BoundingBox, unit: Unit) -> Vector3<f64> {
    bbox.size().map(f64::from) * unit.factor()
}

/// Convert a mm³ volume to `unit`³
pub fn scale_volume(volume_mm3: f64, unit: Unit) -> f64 {
    let factor = unit.factor();
    volume_mm3 * (factor * factor * factor)
}

/// Measurements of one mesh in one display unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub unit: Unit,
    /// Bounding box in millimeters
    pub bounding_box: BoundingBox,
    /// Bounding box extents in `unit`
    pub size: Vector3<f64>,
    /// Longest extent in millimeters, used for tiering
    pub max_dimension_mm: f32,
    /// Volume in `unit`³
    pub volume: f64,
    pub triangle_count: usize,
}

impl Measurement {
    /// `"10.00 x 10.00 x 10.00 mm"`
    pub fn dimensions_text(&self) -> String {
        format!(
            "{:.2} x {:.2} x {:.2} {}",
            self.size.x, self.size.y, self.size.z, self.unit
        )
    }

    /// `"1000.00 cc"`
    pub fn volume_text(&self) -> String {
        format!("{:.2} {}", self.volume, self.unit.volume_suffix())
    }
}

/// Measure a mesh for display in `unit`
pub fn measure(mesh: &DecodedMesh, unit: Unit) -> Measurement {
    let bbox = bounding_box(mesh);

    Measurement {
        unit,
        bounding_box: bbox,
        size: scale_to_unit(&bbox, unit),
        max_dimension_mm: bbox.max_extent(),
        volume: scale_volume(volume(mesh), unit),
        triangle_count: mesh.triangle_count(),
    }
}
