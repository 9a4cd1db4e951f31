//! Triangle and line scan conversion
//!
//! Triangles are filled by walking their three edges with Bresenham steps
//! into a per-row span table, then filling each row between its leftmost and
//! rightmost sample. Near-zero-area triangles are drawn as a single line.
//!
//! Edges and lines are clipped in `f64` before stepping, so the number of
//! steps is bounded by the surface size, not by the input coordinates.
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::color::Color;
use crate::surface::Surface;

/// Signed areas below this are treated as degenerate
pub const AREA_EPSILON: f64 = 1e-8;

/// Rounding allowance when comparing clip parameters
const CLIP_SLACK: f64 = 1e-9;

type Coord = (f64, f64);

/// How pixel colors inside a triangle are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Barycentric weights against the triangle vertices, per pixel
    #[default]
    Barycentric,
    /// Linear blend between the row's left and right edge colors
    Scanline,
}

/// Triangle rasterizer with a configurable interpolation mode
#[derive(Debug, Clone, Copy, Default)]
pub struct Rasterizer {
    pub interpolation: Interpolation,
}

impl Rasterizer {
    pub fn new(interpolation: Interpolation) -> Self {
        Self { interpolation }
    }

    /// Fill a screen-space triangle with per-vertex colors
    #[allow(clippy::too_many_arguments)]
    pub fn fill_triangle<S: Surface + ?Sized>(
        &self,
        p0: Point2<f32>,
        c0: Color,
        p1: Point2<f32>,
        c1: Color,
        p2: Point2<f32>,
        c2: Color,
        surface: &mut S,
    ) {
        let area = signed_area(&p0, &p1, &p2);
        if area.abs() < AREA_EPSILON {
            trace!(?p0, ?p1, ?p2, "degenerate triangle, drawing as line");
            draw_degenerate(p0, c0, p1, c1, p2, c2, surface);
            return;
        }

        let width = surface.width() as i32;
        let height = surface.height() as i32;
        let min_y = (p0.y.min(p1.y).min(p2.y).floor() as i32).max(0);
        let max_y = (p0.y.max(p1.y).max(p2.y).ceil() as i32).min(height - 1);
        if min_y > max_y {
            return;
        }

        let mut spans = SpanTable::new(min_y, max_y, width);
        spans.walk_edge(p0, c0, p1, c1);
        spans.walk_edge(p1, c1, p2, c2);
        spans.walk_edge(p2, c2, p0, c0);

        for (y, span) in spans.rows() {
            let (Some(left_color), Some(right_color)) = (span.left_color, span.right_color) else {
                continue;
            };
            let x_start = (span.left_x.ceil() as i32).max(0);
            let x_end = (span.right_x.floor() as i32).min(width - 1);
            if x_start > x_end {
                continue;
            }

            let span_width = span.right_x - span.left_x;
            for x in x_start..=x_end {
                let color = match self.interpolation {
                    Interpolation::Barycentric => {
                        let (alpha, beta, gamma) =
                            barycentric(&p0, &p1, &p2, x as f64, y as f64, area);
                        Color::blend3(c0, c1, c2, alpha, beta, gamma)
                    }
                    Interpolation::Scanline => {
                        let t = if span_width > 0.0 {
                            (x as f32 - span.left_x) / span_width
                        } else {
                            0.0
                        };
                        left_color.lerp(right_color, t)
                    }
                };
                surface.set_pixel(x, y, color.clamped());
            }
        }
    }
}

/// Fill a triangle with barycentric color interpolation
#[allow(clippy::too_many_arguments)]
pub fn fill_triangle<S: Surface + ?Sized>(
    p0: Point2<f32>,
    c0: Color,
    p1: Point2<f32>,
    c1: Color,
    p2: Point2<f32>,
    c2: Color,
    surface: &mut S,
) {
    Rasterizer::default().fill_triangle(p0, c0, p1, c1, p2, c2, surface);
}

fn coord(p: &Point2<f32>) -> Coord {
    (p.x as f64, p.y as f64)
}

/// Twice the signed area of the triangle
pub fn signed_area(p0: &Point2<f32>, p1: &Point2<f32>, p2: &Point2<f32>) -> f64 {
    let (a, b, c) = (coord(p0), coord(p1), coord(p2));
    (b.1 - c.1) * (a.0 - c.0) + (c.0 - b.0) * (a.1 - c.1)
}

/// Barycentric weights of (px, py); `area` comes from [`signed_area`]
fn barycentric(
    p0: &Point2<f32>,
    p1: &Point2<f32>,
    p2: &Point2<f32>,
    px: f64,
    py: f64,
    area: f64,
) -> (f32, f32, f32) {
    let (a, b, c) = (coord(p0), coord(p1), coord(p2));
    let alpha = ((b.1 - c.1) * (px - c.0) + (c.0 - b.0) * (py - c.1)) / area;
    let beta = ((c.1 - a.1) * (px - c.0) + (a.0 - c.0) * (py - c.1)) / area;
    (alpha as f32, beta as f32, (1.0 - alpha - beta) as f32)
}

fn distance_squared(a: &Point2<f32>, b: &Point2<f32>) -> f64 {
    let (a, b) = (coord(a), coord(b));
    (b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)
}

/// Draw the longest side of a collapsed triangle
fn draw_degenerate<S: Surface + ?Sized>(
    p0: Point2<f32>,
    c0: Color,
    p1: Point2<f32>,
    c1: Color,
    p2: Point2<f32>,
    c2: Color,
    surface: &mut S,
) {
    let pairs = [((p0, c0), (p1, c1)), ((p0, c0), (p2, c2)), ((p1, c1), (p2, c2))];
    let mut longest = pairs[0];
    let mut longest_dist = distance_squared(&p0, &p1);
    for &pair in &pairs[1..] {
        let dist = distance_squared(&pair.0 .0, &pair.1 .0);
        if dist > longest_dist {
            longest = pair;
            longest_dist = dist;
        }
    }
    let ((a, ca), (b, cb)) = longest;
    draw_line_interpolated(surface, a, ca, b, cb);
}

/// Integer Bresenham walk from (x0, y0) to (x1, y1), inclusive.
///
/// The callback receives each pixel with its step index and the total step
/// count. Endpoints must already be clamped near the surface.
fn bresenham(x0: i64, y0: i64, x1: i64, y1: i64, mut visit: impl FnMut(i64, i64, u64, u64)) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let steps = dx.max(-dy) as u64;
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);
    let mut step = 0;

    loop {
        visit(x, y, step, steps);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
        step += 1;
    }
}

fn step_fraction(step: u64, steps: u64) -> f32 {
    if steps == 0 {
        0.0
    } else {
        step as f32 / steps as f32
    }
}

/// Bresenham between `p` and `q` after clamping both into `[lo, hi]`.
///
/// `visit` receives each pixel and the fraction of the walk covered so far.
fn walk_between(p: Coord, q: Coord, lo: Coord, hi: Coord, mut visit: impl FnMut(i64, i64, f32)) {
    let snap = |c: Coord| {
        (
            c.0.clamp(lo.0, hi.0).round() as i64,
            c.1.clamp(lo.1, hi.1).round() as i64,
        )
    };
    let ((x0, y0), (x1, y1)) = (snap(p), snap(q));
    bresenham(x0, y0, x1, y1, |x, y, step, steps| {
        visit(x, y, step_fraction(step, steps))
    });
}

/// Pixel rectangle a line may touch, one pixel of margin on every side
fn line_bounds<S: Surface + ?Sized>(surface: &S) -> (Coord, Coord) {
    ((-1.0, -1.0), (surface.width() as f64, surface.height() as f64))
}

/// Draw a solid line using Bresenham's algorithm
pub fn draw_line<S: Surface + ?Sized>(
    surface: &mut S,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    color: Color,
) {
    let (lo, hi) = line_bounds(surface);
    let segment = Segment::new((x0 as f64, y0 as f64), (x1 as f64, y1 as f64));
    let Some((start, end)) = segment.clip(lo, hi) else {
        return;
    };
    walk_between(start, end, lo, hi, |x, y, _| {
        surface.set_pixel(x as i32, y as i32, color)
    });
}

/// Draw a line whose color blends from `c0` to `c1` along its steps
pub fn draw_line_interpolated<S: Surface + ?Sized>(
    surface: &mut S,
    p0: Point2<f32>,
    c0: Color,
    p1: Point2<f32>,
    c1: Color,
) {
    let (lo, hi) = line_bounds(surface);
    let segment = Segment::new(coord(&p0), coord(&p1));
    let Some((start, end)) = segment.clip(lo, hi) else {
        return;
    };
    let (t0, t1) = (segment.param(start), segment.param(end));
    walk_between(start, end, lo, hi, |x, y, fraction| {
        let color = c0.lerp(c1, t0 + (t1 - t0) * fraction).clamped();
        surface.set_pixel(x as i32, y as i32, color);
    });
}

/// Clip a segment to the rectangle [0, max_x] x [0, max_y] (Liang-Barsky)
pub fn clip_segment(
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    max_x: f32,
    max_y: f32,
) -> Option<(f32, f32, f32, f32)> {
    if max_x < 0.0 || max_y < 0.0 {
        return None;
    }
    let segment = Segment::new((x0 as f64, y0 as f64), (x1 as f64, y1 as f64));
    let (start, end) = segment.clip((0.0, 0.0), (max_x as f64, max_y as f64))?;
    Some((start.0 as f32, start.1 as f32, end.0 as f32, end.1 as f32))
}

/// Boundary line a clipped endpoint lies on
#[derive(Debug, Clone, Copy)]
enum Boundary {
    Column(f64),
    Row(f64),
}

/// A segment in `f64` pixel space
#[derive(Debug, Clone, Copy)]
struct Segment {
    a: Coord,
    b: Coord,
}

impl Segment {
    fn new(a: Coord, b: Coord) -> Self {
        Self { a, b }
    }

    fn delta(&self) -> Coord {
        (self.b.0 - self.a.0, self.b.1 - self.a.1)
    }

    /// Height of the segment's line at column `x`; needs a non-vertical segment.
    ///
    /// Interpolates from the nearer endpoint to keep precision when the
    /// other one is far away.
    fn y_at(&self, x: f64) -> f64 {
        let (dx, dy) = self.delta();
        if (x - self.a.0).abs() <= (x - self.b.0).abs() {
            self.a.1 + (x - self.a.0) * dy / dx
        } else {
            self.b.1 + (x - self.b.0) * dy / dx
        }
    }

    /// Column of the segment's line at row `y`; needs a non-horizontal segment.
    fn x_at(&self, y: f64) -> f64 {
        let (dx, dy) = self.delta();
        if (y - self.a.1).abs() <= (y - self.b.1).abs() {
            self.a.0 + (y - self.a.1) * dx / dy
        } else {
            self.b.0 + (y - self.b.1) * dx / dy
        }
    }

    /// Sort key ordering points on the segment from `a` to `b`
    fn key(&self, c: Coord) -> f64 {
        let (dx, dy) = self.delta();
        if dx.abs() >= dy.abs() {
            c.0 * dx.signum()
        } else {
            c.1 * dy.signum()
        }
    }

    /// Fraction of the way from `a` to `b`, in [0, 1]
    fn param(&self, c: Coord) -> f32 {
        let (dx, dy) = self.delta();
        let t = if dx.abs() >= dy.abs() {
            if dx == 0.0 {
                return 0.0;
            }
            (c.0 - self.a.0) / dx
        } else {
            (c.1 - self.a.1) / dy
        };
        t.clamp(0.0, 1.0) as f32
    }

    fn point_on(&self, boundary: Boundary) -> Coord {
        match boundary {
            Boundary::Column(x) => (x, self.y_at(x)),
            Boundary::Row(y) => (self.x_at(y), y),
        }
    }

    /// Part of the segment inside `[lo, hi]` (Liang-Barsky).
    ///
    /// Clipped endpoints are solved against the boundary they lie on rather
    /// than interpolated by parameter, so they stay exact on that boundary.
    /// Bounds may be infinite.
    fn clip(&self, lo: Coord, hi: Coord) -> Option<(Coord, Coord)> {
        let (dx, dy) = self.delta();
        let (mut t0, mut t1) = (0.0, 1.0);
        let (mut start, mut end) = (self.a, self.b);
        let planes = [
            (-dx, self.a.0 - lo.0, Boundary::Column(lo.0)),
            (dx, hi.0 - self.a.0, Boundary::Column(hi.0)),
            (-dy, self.a.1 - lo.1, Boundary::Row(lo.1)),
            (dy, hi.1 - self.a.1, Boundary::Row(hi.1)),
        ];

        for (p, q, boundary) in planes {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r > t1 + CLIP_SLACK {
                    return None;
                }
                if r > t0 {
                    t0 = r;
                    start = self.point_on(boundary);
                }
            } else {
                if r < t0 - CLIP_SLACK {
                    return None;
                }
                if r < t1 {
                    t1 = r;
                    end = self.point_on(boundary);
                }
            }
        }

        Some((start, end))
    }
}

/// Left and right boundary of one scanline
#[derive(Debug, Clone, Copy)]
struct Span {
    left_x: f32,
    right_x: f32,
    left_color: Option<Color>,
    right_color: Option<Color>,
}

impl Span {
    const EMPTY: Span = Span {
        left_x: f32::INFINITY,
        right_x: f32::NEG_INFINITY,
        left_color: None,
        right_color: None,
    };

    fn record(&mut self, x: f32, color: Color) {
        if x < self.left_x {
            self.left_x = x;
            self.left_color = Some(color);
        }
        if x > self.right_x {
            self.right_x = x;
            self.right_color = Some(color);
        }
    }
}

/// Per-row edge boundaries for a single triangle
struct SpanTable {
    min_y: i32,
    max_y: i32,
    width: i32,
    rows: Vec<Span>,
}

impl SpanTable {
    fn new(min_y: i32, max_y: i32, width: i32) -> Self {
        Self {
            min_y,
            max_y,
            width,
            rows: vec![Span::EMPTY; (max_y - min_y + 1) as usize],
        }
    }

    /// Record every row the edge from `a` to `b` crosses.
    ///
    /// The edge is cut to the table's rows and split where it crosses the
    /// columns -1 and `width`; pieces beyond those columns are walked as
    /// vertical runs on the column they crossed.
    fn walk_edge(&mut self, a: Point2<f32>, ca: Color, b: Point2<f32>, cb: Color) {
        let segment = Segment::new(coord(&a), coord(&b));
        let lo = (-1.0, self.min_y as f64 - 1.0);
        let hi = (self.width as f64, self.max_y as f64 + 1.0);
        let rows_only = ((f64::NEG_INFINITY, lo.1), (f64::INFINITY, hi.1));
        let Some((start, end)) = segment.clip(rows_only.0, rows_only.1) else {
            return;
        };

        let mut stops = [start, end, start, start];
        let mut count = 2;
        if segment.a.0 != segment.b.0 {
            let (k0, k1) = (segment.key(start), segment.key(end));
            for x in [lo.0, hi.0] {
                let cut = segment.point_on(Boundary::Column(x));
                let k = segment.key(cut);
                if k > k0.min(k1) && k < k0.max(k1) {
                    stops[count] = cut;
                    count += 1;
                }
            }
        }
        let stops = &mut stops[..count];
        stops.sort_by(|p, q| segment.key(*p).total_cmp(&segment.key(*q)));

        let (min_y, max_y) = (self.min_y as i64, self.max_y as i64);
        let rows = &mut self.rows;
        for pair in stops.windows(2) {
            let (p, q) = (pair[0], pair[1]);
            let (tp, tq) = (segment.param(p), segment.param(q));
            let mid = (p.0 + q.0) / 2.0;
            let (p, q) = if mid < lo.0 {
                ((lo.0, p.1), (lo.0, q.1))
            } else if mid > hi.0 {
                ((hi.0, p.1), (hi.0, q.1))
            } else {
                (p, q)
            };

            walk_between(p, q, lo, hi, |x, y, fraction| {
                if y >= min_y && y <= max_y {
                    let color = ca.lerp(cb, tp + (tq - tp) * fraction);
                    rows[(y - min_y) as usize].record(x as f32, color);
                }
            });
        }
    }

    fn rows(&self) -> impl Iterator<Item = (i32, &Span)> {
        (self.min_y..=self.max_y).zip(self.rows.iter())
    }
}
