/// Binary STL decoder and encoder
///
/// Layout: an 80-byte header, a little-endian `u32` triangle count, then one
/// 50-byte record per triangle (normal, three vertices, attribute count).
/// Stored normals are skipped; consumers recompute them from the winding.
use memchr::memmem;
use nalgebra::Point3;
use nom::{
    bytes::complete::take,
    multi::count,
    number::complete::{le_f32, le_u16, le_u32},
    sequence::tuple,
    IResult,
};

use crate::error::DecodeError;
use crate::geometry::{DecodedMesh, Triangle};

pub const HEADER_LEN: usize = 80;
pub const PREAMBLE_LEN: usize = HEADER_LEN + 4;
pub const RECORD_LEN: usize = 50;

/// Bytes inspected when deciding whether input is ASCII STL
const SNIFF_LEN: usize = 512;

/// Decode an STL buffer, rejecting the ASCII variant
pub fn decode(data: &[u8]) -> Result<DecodedMesh, DecodeError> {
    if looks_like_ascii(data) {
        return Err(DecodeError::UnsupportedFormat);
    }
    parse_binary_stl(data)
}

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> Result<DecodedMesh, DecodeError> {
    let truncated_header = DecodeError::TruncatedHeader { len: data.len() };
    if data.len() < PREAMBLE_LEN {
        return Err(truncated_header);
    }

    let (body, declared) = preamble(data).map_err(|_| truncated_header)?;

    let expected_len = PREAMBLE_LEN as u64 + RECORD_LEN as u64 * u64::from(declared);
    let truncated_body = DecodeError::TruncatedBody {
        declared,
        expected_len,
        actual_len: data.len(),
    };
    if expected_len > data.len() as u64 {
        return Err(truncated_body);
    }

    // Trailing bytes past the last record are ignored
    let (_, triangles) = count(facet, declared as usize)(body).map_err(|_| truncated_body)?;

    Ok(DecodedMesh::from_triangles(triangles))
}

fn preamble(input: &[u8]) -> IResult<&[u8], u32> {
    let (input, _header) = take(HEADER_LEN)(input)?;
    le_u32(input)
}

fn facet(input: &[u8]) -> IResult<&[u8], Triangle> {
    let (input, _normal) = take(12usize)(input)?;
    let (input, (v0, v1, v2)) = tuple((point, point, point))(input)?;
    let (input, _attribute_count) = le_u16(input)?;
    Ok((input, Triangle::new(v0, v1, v2)))
}

fn point(input: &[u8]) -> IResult<&[u8], Point3<f32>> {
    let (input, (x, y, z)) = tuple((le_f32, le_f32, le_f32))(input)?;
    Ok((input, Point3::new(x, y, z)))
}

/// ASCII STL starts with `solid` and reads as text with facet keywords.
///
/// Binary exporters often write `solid` into the header too, so the prefix
/// alone is not enough.
fn looks_like_ascii(data: &[u8]) -> bool {
    let sample = &data[..data.len().min(SNIFF_LEN)];
    let start = sample
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(sample.len());

    if !sample[start..].starts_with(b"solid") {
        return false;
    }
    // Non-ASCII bytes are allowed so UTF-8 solid names still read as text
    if sample
        .iter()
        .any(|b| b.is_ascii_control() && !b.is_ascii_whitespace())
    {
        return false;
    }

    memmem::find(sample, b"facet").is_some() || memmem::find(sample, b"endsolid").is_some()
}

/// Encode a mesh as binary STL with normals recomputed from the winding
pub fn write_binary_stl(mesh: &DecodedMesh) -> Vec<u8> {
    let mut out = Vec::with_capacity(PREAMBLE_LEN + RECORD_LEN * mesh.triangle_count());

    let mut header = [0u8; HEADER_LEN];
    let label = b"binary STL written by stlmeter";
    header[..label.len()].copy_from_slice(label);
    out.extend_from_slice(&header);

    // Counts past u32::MAX cannot be represented by the format
    let triangle_count = u32::try_from(mesh.triangle_count()).unwrap_or(u32::MAX);
    out.extend_from_slice(&triangle_count.to_le_bytes());

    for triangle in mesh.triangles.iter().take(triangle_count as usize) {
        let normal = triangle.calculate_normal();
        for component in normal.iter() {
            out.extend_from_slice(&component.to_le_bytes());
        }
        for vertex in &triangle.vertices {
            for coord in vertex.coords.iter() {
                out.extend_from_slice(&coord.to_le_bytes());
            }
        }
        out.extend_from_slice(&0u16.to_le_bytes());
    }

    out
}
