//! Mesh storage and the interface the render pipeline reads meshes through
use nalgebra::Point3;

/// Read access to a polygon mesh
pub trait MeshSource {
    fn vertex_count(&self) -> usize;

    /// Position of vertex `index`, `None` when out of range
    fn vertex(&self, index: usize) -> Option<Point3<f32>>;

    fn polygon_count(&self) -> usize;

    /// Ordered vertex indices of polygon `index`
    fn polygon(&self, index: usize) -> &[usize];
}

/// An indexed polygon mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Point3<f32>>,
    pub polygons: Vec<Vec<usize>>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, polygons: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            polygons: Vec::with_capacity(polygons),
        }
    }

    /// Append a vertex and return its index
    pub fn add_vertex(&mut self, position: Point3<f32>) -> usize {
        self.vertices.push(position);
        self.vertices.len() - 1
    }

    pub fn add_polygon(&mut self, indices: Vec<usize>) {
        self.polygons.push(indices);
    }

    /// Append three new vertices and the triangle joining them
    pub fn add_triangle(&mut self, a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) {
        let i0 = self.add_vertex(a);
        let i1 = self.add_vertex(b);
        let i2 = self.add_vertex(c);
        self.add_polygon(vec![i0, i1, i2]);
    }

    /// Create a cube centred on the origin, two triangles per face
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        let mut mesh = Self::with_capacity(8, 12);
        for &(x, y, z) in &[
            (-h, -h, h),
            (h, -h, h),
            (h, h, h),
            (-h, h, h),
            (-h, -h, -h),
            (h, -h, -h),
            (h, h, -h),
            (-h, h, -h),
        ] {
            mesh.add_vertex(Point3::new(x, y, z));
        }

        const FACES: [[usize; 4]; 6] = [
            [0, 1, 2, 3], // front
            [5, 4, 7, 6], // back
            [3, 2, 6, 7], // top
            [4, 5, 1, 0], // bottom
            [1, 5, 6, 2], // right
            [4, 0, 3, 7], // left
        ];
        for [a, b, c, d] in FACES {
            mesh.add_polygon(vec![a, b, c]);
            mesh.add_polygon(vec![a, c, d]);
        }
        mesh
    }
}

impl MeshSource for Mesh {
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn vertex(&self, index: usize) -> Option<Point3<f32>> {
        self.vertices.get(index).copied()
    }

    fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    fn polygon(&self, index: usize) -> &[usize] {
        self.polygons.get(index).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_layout() {
        let cube = Mesh::cube(2.0);
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.polygon_count(), 12);
        assert!(cube.polygons.iter().all(|p| p.len() == 3));
        assert!(cube
            .polygons
            .iter()
            .flatten()
            .all(|&i| i < cube.vertex_count()));
        assert_eq!(cube.vertex(2), Some(Point3::new(1.0, 1.0, 1.0)));
    }

    #[test]
    fn test_add_triangle_appends_vertices() {
        let mut mesh = Mesh::new();
        mesh.add_triangle(Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0));
        mesh.add_triangle(Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0));
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.polygon(1), &[3, 4, 5]);
    }

    #[test]
    fn test_out_of_range_access() {
        let mesh = Mesh::new();
        assert_eq!(mesh.vertex(0), None);
        assert!(mesh.polygon(3).is_empty());
    }
}
