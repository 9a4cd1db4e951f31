//! Mesh render pipeline: projection, LOD polygon skipping and rasterization
use nalgebra::{Matrix4, Point2, Point3};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::color::Color;
use crate::error::RenderError;
use crate::geometry::MeshSource;
use crate::projection::Camera;
use crate::raster::{Interpolation, Rasterizer};
use crate::surface::Surface;
use crate::transform::{from_homogeneous, mvp_matrix, Transform};

/// What to draw for each polygon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Uniform color for filled polygons
    pub fill_color: Color,
    pub wireframe_color: Color,
    pub show_filled: bool,
    pub show_wireframe: bool,
    pub interpolation: Interpolation,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            fill_color: Color::LIGHT_GRAY,
            wireframe_color: Color::WHITE,
            show_filled: true,
            show_wireframe: false,
            interpolation: Interpolation::Barycentric,
        }
    }
}

/// Counters for one rendered frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub polygons_total: usize,
    pub polygons_rendered: usize,
    /// Visited polygons dropped as malformed or unprojectable
    pub polygons_skipped: usize,
    pub stride: usize,
}

/// Polygon stride for a mesh of `polygon_count` polygons.
///
/// Large meshes are drawn incompletely rather than more cheaply per polygon:
/// every 2nd polygon above 10k, every 3rd above 50k, every 4th above 100k.
pub fn lod_stride(polygon_count: usize) -> usize {
    match polygon_count {
        0..=10_000 => 1,
        10_001..=50_000 => 2,
        50_001..=100_000 => 3,
        _ => 4,
    }
}

/// Map a model-space point through `combined` to pixel coordinates.
///
/// `w` near zero is left undivided.
pub fn project_vertex(
    combined: &Matrix4<f32>,
    point: &Point3<f32>,
    width: u32,
    height: u32,
) -> Point2<f32> {
    let ndc = from_homogeneous(&(combined * point.to_homogeneous()));
    Point2::new(
        (ndc.x + 1.0) * 0.5 * width as f32,
        (1.0 - ndc.y) * 0.5 * height as f32,
    )
}

/// Render `mesh` seen through `camera` into `surface`
pub fn render<M, S>(
    camera: &Camera,
    mesh: &M,
    model: &Transform,
    surface: &mut S,
    settings: &RenderSettings,
) -> Result<RenderStats, RenderError>
where
    M: MeshSource + ?Sized,
    S: Surface + ?Sized,
{
    let combined = mvp_matrix(&model.matrix(), &camera.view_matrix(), &camera.projection_matrix()?);
    let (width, height) = (surface.width(), surface.height());
    let rasterizer = Rasterizer::new(settings.interpolation);

    let polygon_count = mesh.polygon_count();
    let stride = lod_stride(polygon_count);
    let mut stats = RenderStats {
        polygons_total: polygon_count,
        stride,
        ..RenderStats::default()
    };

    let mut screen: Vec<Point2<f32>> = Vec::with_capacity(4);
    for index in (0..polygon_count).step_by(stride) {
        let polygon = mesh.polygon(index);
        if polygon.len() < 3 {
            stats.polygons_skipped += 1;
            continue;
        }

        screen.clear();
        for &vertex in polygon {
            let Some(position) = mesh.vertex(vertex) else {
                break;
            };
            let p = project_vertex(&combined, &position, width, height);
            // Far off-screen points are fine, the rasterizer clips them
            if !(p.x.is_finite() && p.y.is_finite()) {
                break;
            }
            screen.push(p);
        }
        if screen.len() != polygon.len() {
            trace!(polygon = index, "skipping polygon with unusable vertices");
            stats.polygons_skipped += 1;
            continue;
        }

        if settings.show_filled {
            let fill = settings.fill_color;
            for i in 1..screen.len() - 1 {
                let (a, b, c) = (screen[0], screen[i], screen[i + 1]);
                rasterizer.fill_triangle(a, fill, b, fill, c, fill, surface);
            }
        }
        if settings.show_wireframe {
            for (i, a) in screen.iter().enumerate() {
                let b = screen[(i + 1) % screen.len()];
                surface.stroke_line(a.x, a.y, b.x, b.y, settings.wireframe_color);
            }
        }
        stats.polygons_rendered += 1;
    }

    debug!(
        total = stats.polygons_total,
        rendered = stats.polygons_rendered,
        skipped = stats.polygons_skipped,
        stride,
        "rendered mesh"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Mesh;
    use crate::surface::Framebuffer;

    #[test]
    fn test_lod_stride_thresholds() {
        assert_eq!(lod_stride(0), 1);
        assert_eq!(lod_stride(5_000), 1);
        assert_eq!(lod_stride(10_000), 1);
        assert_eq!(lod_stride(10_001), 2);
        // 60_000 is past the 50_000 threshold: stride 3, not 2 (see DESIGN.md)
        assert_eq!(lod_stride(60_000), 3);
        assert_eq!(lod_stride(100_000), 3);
        assert_eq!(lod_stride(100_001), 4);
    }

    #[test]
    fn test_settings_defaults_from_json() {
        let settings: RenderSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, RenderSettings::default());
        assert!(settings.show_filled && !settings.show_wireframe);

        let settings: RenderSettings = serde_json::from_str(
            r#"{
                "show_wireframe": true,
                "wireframe_color": { "r": 0.0, "g": 1.0, "b": 0.0 },
                "interpolation": "scanline"
            }"#,
        )
        .unwrap();
        assert!(settings.show_wireframe);
        assert_eq!(settings.wireframe_color, Color::GREEN);
        assert_eq!(settings.interpolation, Interpolation::Scanline);
    }

    #[test]
    fn test_project_vertex_viewport_mapping() {
        let identity = Matrix4::identity();
        let center = project_vertex(&identity, &Point3::origin(), 200, 100);
        assert_eq!(center, Point2::new(100.0, 50.0));
        let corner = project_vertex(&identity, &Point3::new(-1.0, 1.0, 0.0), 200, 100);
        assert_eq!(corner, Point2::new(0.0, 0.0));
    }

    #[test]
    fn test_render_cube_fills_center() {
        let camera = Camera::for_viewport(100, 100).unwrap();
        let mut fb = Framebuffer::new(100, 100);
        let settings = RenderSettings::default();
        let stats =
            render(&camera, &Mesh::cube(2.0), &Transform::identity(), &mut fb, &settings).unwrap();
        assert_eq!(stats.polygons_rendered, 12);
        assert_eq!(fb.pixel(50, 50), Some([191, 191, 191, 255]));
    }

    #[test]
    fn test_render_skips_malformed_polygons() {
        let mut mesh = Mesh::cube(1.0);
        mesh.add_polygon(vec![0, 1]);
        mesh.add_polygon(vec![0, 1, 99]);
        let camera = Camera::for_viewport(64, 64).unwrap();
        let mut fb = Framebuffer::new(64, 64);
        let settings = RenderSettings::default();
        let stats = render(&camera, &mesh, &Transform::identity(), &mut fb, &settings).unwrap();
        assert_eq!(stats.polygons_rendered, 12);
        assert_eq!(stats.polygons_skipped, 2);
    }

    #[test]
    fn test_render_skips_non_finite_vertices() {
        let mut mesh = Mesh::cube(1.0);
        let far = mesh.add_vertex(Point3::new(f32::INFINITY, 0.0, 0.0));
        mesh.add_polygon(vec![0, 1, far]);
        let camera = Camera::for_viewport(64, 64).unwrap();
        let mut fb = Framebuffer::new(64, 64);
        let settings = RenderSettings::default();
        let stats = render(&camera, &mesh, &Transform::identity(), &mut fb, &settings).unwrap();
        assert_eq!(stats.polygons_rendered, 12);
        assert_eq!(stats.polygons_skipped, 1);
    }
}
