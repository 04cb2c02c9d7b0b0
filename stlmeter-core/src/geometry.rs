/// Geometry primitives for decoded meshes
use nalgebra::{Point3, Vector3};

/// A triangle face defined by three vertices in file winding order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Point3<f32>; 3],
}

impl Triangle {
    pub fn new(v0: Point3<f32>, v1: Point3<f32>, v2: Point3<f32>) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Calculate the face normal from the triangle's winding.
    ///
    /// Degenerate triangles (coincident or collinear vertices) yield the zero vector.
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let [v0, v1, v2] = self.vertices;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1
            .cross(&edge2)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }

    /// The same face with opposite winding
    pub fn flipped(&self) -> Self {
        let [v0, v1, v2] = self.vertices;
        Self::new(v0, v2, v1)
    }
}

/// An ordered list of triangles as read from an STL file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedMesh {
    pub triangles: Vec<Triangle>,
}

impl DecodedMesh {
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn from_triangles(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Every vertex of every triangle, in file order
    pub fn vertices(&self) -> impl Iterator<Item = &Point3<f32>> {
        self.triangles.iter().flat_map(|t| t.vertices.iter())
    }

    /// A copy of this mesh with every triangle's winding reversed
    pub fn with_reversed_winding(&self) -> Self {
        Self::from_triangles(self.triangles.iter().map(Triangle::flipped).collect())
    }

    /// Axis-aligned cube spanning `(0,0,0)`..`(side,side,side)`, wound outward
    pub fn cube(side: f32) -> Self {
        let p = |x: f32, y: f32, z: f32| Point3::new(x * side, y * side, z * side);
        let mut mesh = Self::with_capacity(12);

        // Front face (z = side)
        mesh.add_triangle(Triangle::new(p(0.0, 0.0, 1.0), p(1.0, 0.0, 1.0), p(1.0, 1.0, 1.0)));
        mesh.add_triangle(Triangle::new(p(0.0, 0.0, 1.0), p(1.0, 1.0, 1.0), p(0.0, 1.0, 1.0)));

        // Back face (z = 0)
        mesh.add_triangle(Triangle::new(p(0.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(1.0, 1.0, 0.0)));
        mesh.add_triangle(Triangle::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(1.0, 0.0, 0.0)));

        // Top face (y = side)
        mesh.add_triangle(Triangle::new(p(0.0, 1.0, 0.0), p(0.0, 1.0, 1.0), p(1.0, 1.0, 1.0)));
        mesh.add_triangle(Triangle::new(p(0.0, 1.0, 0.0), p(1.0, 1.0, 1.0), p(1.0, 1.0, 0.0)));

        // Bottom face (y = 0)
        mesh.add_triangle(Triangle::new(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 0.0, 1.0)));
        mesh.add_triangle(Triangle::new(p(0.0, 0.0, 0.0), p(1.0, 0.0, 1.0), p(0.0, 0.0, 1.0)));

        // Right face (x = side)
        mesh.add_triangle(Triangle::new(p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(1.0, 1.0, 1.0)));
        mesh.add_triangle(Triangle::new(p(1.0, 0.0, 0.0), p(1.0, 1.0, 1.0), p(1.0, 0.0, 1.0)));

        // Left face (x = 0)
        mesh.add_triangle(Triangle::new(p(0.0, 0.0, 0.0), p(0.0, 0.0, 1.0), p(0.0, 1.0, 1.0)));
        mesh.add_triangle(Triangle::new(p(0.0, 0.0, 0.0), p(0.0, 1.0, 1.0), p(0.0, 1.0, 0.0)));

        mesh
    }
}

/// Axis-aligned bounding box over all vertices of a mesh, in millimeters.
///
/// The empty box (no vertices seen) has `min = +inf` and `max = -inf`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl BoundingBox {
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn expand_to_include(&mut self, point: &Point3<f32>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// Extent along each axis; zero for the empty box
    pub fn size(&self) -> Vector3<f32> {
        if self.is_empty() {
            Vector3::zeros()
        } else {
            self.max - self.min
        }
    }

    /// Largest of the three extents
    pub fn max_extent(&self) -> f32 {
        self.size().max()
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}
