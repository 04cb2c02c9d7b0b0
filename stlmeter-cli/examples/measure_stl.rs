/// Example: Measure an STL file in every unit
///
/// Usage: cargo run --example measure_stl -- path/to/file.stl

use std::env;
use std::fs;
use std::io;
use stlmeter_core::{analysis, select_tier, stl, DecodedMesh, Unit};

fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mesh = if args.len() < 2 {
        eprintln!("Usage: {} <stl-file>", args[0]);
        eprintln!("\nNo STL file provided, using a 10 mm cube...");
        DecodedMesh::cube(10.0)
    } else {
        let data = fs::read(&args[1])
            .map_err(|e| io::Error::new(io::ErrorKind::NotFound, format!("Failed to read STL file: {}", e)))?;
        stl::decode(&data)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("Failed to parse STL: {}", e)))?
    };

    println!("Loaded {} triangles", mesh.triangle_count());
    for unit in Unit::ALL {
        let m = analysis::measure(&mesh, unit);
        println!("{:>4}: {} | {}", unit, m.dimensions_text(), m.volume_text());
    }
    println!("Printer: {}", select_tier(analysis::bounding_box(&mesh).max_extent()));

    Ok(())
}
