//! Terminal front-end for the meshview software renderer
use anyhow::Context;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use meshview_core::{
    projection::fov_radians, render, Camera, Mesh, OrbitController, RenderStats, Transform,
};
use nalgebra::{Point3, Vector3};
use std::io::{stdout, Write};
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub mod config;
pub mod renderer;

pub use config::ViewerConfig;
pub use renderer::CellSurface;

/// Fraction of the half-screen the framed model should cover
const FRAME_FILL: f32 = 0.6;

/// Key reference shown in the overlay
const HELP: &str =
    "drag/arrows=orbit wasd/rf=move +/-=zoom 0=reset 1=fill 2=wire space=spin q=quit";

/// Zoom step per wheel notch, as a fraction of the orbit radius
const WHEEL_ZOOM: f32 = 0.1;

/// Terminal cells are roughly twice as tall as they are wide
fn cell_aspect(width: u16, height: u16) -> f32 {
    width.max(1) as f32 / (2.0 * height.max(1) as f32)
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    mesh: Mesh,
    config: ViewerConfig,
    camera: Camera,
    orbit: OrbitController,
    surface: CellSurface,
    /// Recentres the model on the origin
    centering: Transform,
    spin_angle: f32,
    spinning: bool,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
    stats: RenderStats,
}

impl TerminalApp {
    pub fn new(mesh: Mesh, config: ViewerConfig) -> anyhow::Result<Self> {
        let (width, height) = terminal::size().context("querying terminal size")?;
        Self::with_size(mesh, config, width, height)
    }

    /// Build the app for a fixed grid size without touching the terminal
    pub fn with_size(
        mesh: Mesh,
        config: ViewerConfig,
        width: u16,
        height: u16,
    ) -> anyhow::Result<Self> {
        let (center, radius) = bounding_sphere(&mesh);
        let mut camera = Camera::new(
            Point3::new(0.0, 0.0, 5.0),
            Point3::origin(),
            config.fov,
            cell_aspect(width, height),
            0.1,
            100.0,
        )
        .context("building camera")?;
        camera.set_position(Point3::new(0.0, 0.0, framing_distance(&camera, radius)));
        let orbit = OrbitController::new(&camera, config.orbit);

        info!(
            vertices = mesh.vertices.len(),
            polygons = mesh.polygons.len(),
            radius,
            "viewer ready"
        );

        Ok(Self {
            mesh,
            centering: Transform::Translation(-center.coords),
            spinning: config.spin,
            config,
            camera,
            orbit,
            surface: CellSurface::new(width as usize, height as usize),
            spin_angle: 0.0,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
            stats: RenderStats::default(),
        })
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn surface(&self) -> &CellSurface {
        &self.surface
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, EnableMouseCapture, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), DisableMouseCapture, terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> anyhow::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / self.config.target_fps.max(1) as u64);

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                let event = event::read()?;
                self.handle_event(event);
            }

            self.update();
            self.draw()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        info!("viewer closed");
        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => self.resize(width, height),
            _ => {}
        }
    }

    fn handle_key(&mut self, KeyEvent { code, kind, .. }: KeyEvent) {
        if kind == KeyEventKind::Release {
            return;
        }
        let step = 0.1;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Left => self.orbit.rotate(&mut self.camera, -step, 0.0),
            KeyCode::Right => self.orbit.rotate(&mut self.camera, step, 0.0),
            KeyCode::Up => self.orbit.rotate(&mut self.camera, 0.0, -step),
            KeyCode::Down => self.orbit.rotate(&mut self.camera, 0.0, step),
            KeyCode::Char('w') => self.orbit.move_forward(&mut self.camera),
            KeyCode::Char('s') => self.orbit.move_backward(&mut self.camera),
            KeyCode::Char('a') => self.orbit.move_left(&mut self.camera),
            KeyCode::Char('d') => self.orbit.move_right(&mut self.camera),
            KeyCode::Char('r') => self.orbit.move_up(&mut self.camera),
            KeyCode::Char('f') => self.orbit.move_down(&mut self.camera),
            KeyCode::Char('+') | KeyCode::Char('=') => self.zoom_notches(1.0),
            KeyCode::Char('-') => self.zoom_notches(-1.0),
            KeyCode::Char('0') => self.orbit.reset(&mut self.camera),
            KeyCode::Char('1') => self.config.render.show_filled = !self.config.render.show_filled,
            KeyCode::Char('2') => {
                self.config.render.show_wireframe = !self.config.render.show_wireframe
            }
            KeyCode::Char(' ') => self.spinning = !self.spinning,
            _ => {}
        }
    }

    fn handle_mouse(&mut self, MouseEvent { kind, column, row, .. }: MouseEvent) {
        let (x, y) = (column as f32, row as f32);
        match kind {
            MouseEventKind::Down(MouseButton::Left) => self.orbit.on_press(x, y),
            MouseEventKind::Drag(MouseButton::Left) => self.orbit.on_drag(&mut self.camera, x, y),
            MouseEventKind::Up(MouseButton::Left) => self.orbit.on_release(),
            MouseEventKind::ScrollUp => self.zoom_notches(1.0),
            MouseEventKind::ScrollDown => self.zoom_notches(-1.0),
            _ => {}
        }
    }

    /// Zoom proportionally to the current orbit radius
    fn zoom_notches(&mut self, notches: f32) {
        let radius = (self.camera.position() - self.camera.target()).norm();
        let per_unit = self.config.orbit.zoom_sensitivity.max(f32::EPSILON) * 0.01;
        self.orbit.zoom(&mut self.camera, notches * WHEEL_ZOOM * radius / per_unit);
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.surface.resize(width as usize, height as usize);
        if let Err(e) = self.camera.set_aspect_ratio(cell_aspect(width, height)) {
            warn!(width, height, error = %e, "keeping previous aspect ratio");
        }
    }

    fn update(&mut self) {
        if self.spinning {
            self.spin_angle += self.config.spin_speed;
        }
    }

    fn model_transform(&self) -> Transform {
        Transform::compose(&[
            Transform::rotation(self.config.spin_axis, self.spin_angle),
            self.centering,
        ])
    }

    /// Render the current frame into the cell surface
    pub fn render_frame(&mut self) -> anyhow::Result<()> {
        self.surface.clear();
        self.stats = render(
            &self.camera,
            &self.mesh,
            &self.model_transform(),
            &mut self.surface,
            &self.config.render,
        )?;
        Ok(())
    }

    fn draw(&mut self) -> anyhow::Result<()> {
        self.render_frame()?;

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;
        self.surface.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "meshview | FPS: {:.1} | polys {}/{} (every {}) | {}",
                self.fps,
                self.stats.polygons_rendered,
                self.stats.polygons_total,
                self.stats.stride,
                HELP
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

/// Centroid of the vertices and the largest distance from it
fn bounding_sphere(mesh: &Mesh) -> (Point3<f32>, f32) {
    if mesh.vertices.is_empty() {
        return (Point3::origin(), 1.0);
    }
    let sum = mesh
        .vertices
        .iter()
        .fold(Vector3::zeros(), |acc, v| acc + v.coords);
    let center = Point3::from(sum / mesh.vertices.len() as f32);
    let radius = mesh
        .vertices
        .iter()
        .map(|v| (v - center).norm())
        .fold(0.0f32, f32::max);
    (center, radius.max(1e-3))
}

/// Camera distance at which a sphere of `radius` covers [`FRAME_FILL`] of the view.
///
/// After the divide, the half-height of the sphere in NDC is
/// `radius / (tan(fov/2) * k * distance)` where `k = 2·far·near / (far − near)`.
fn framing_distance(camera: &Camera, radius: f32) -> f32 {
    let (near, far) = (camera.near_plane(), camera.far_plane());
    let k = 2.0 * far * near / (far - near);
    let tan_half = (fov_radians(camera.fov()) / 2.0).tan();
    radius / (FRAME_FILL * tan_half * k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use meshview_core::Surface;

    fn app() -> TerminalApp {
        TerminalApp::with_size(Mesh::cube(2.0), ViewerConfig::default(), 80, 24).unwrap()
    }

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_frames_model_on_screen() {
        let mut app = app();
        app.render_frame().unwrap();
        assert_eq!(app.stats.polygons_rendered, 12);
        let lit = app.surface().lit_cells();
        assert!(lit > 0 && lit < 80 * 24, "lit cells: {lit}");
    }

    #[test]
    fn test_bounding_sphere_centers_offset_mesh() {
        let mut mesh = Mesh::cube(2.0);
        for v in &mut mesh.vertices {
            v.x += 10.0;
        }
        let (center, radius) = bounding_sphere(&mesh);
        assert!((center - Point3::new(10.0, 0.0, 0.0)).norm() < 1e-4);
        assert!((radius - 3f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn test_keys_toggle_settings_and_quit() {
        let mut app = app();
        app.handle_event(key('1'));
        app.handle_event(key('2'));
        assert!(!app.config().render.show_filled);
        assert!(app.config().render.show_wireframe);
        app.handle_event(key(' '));
        assert!(!app.spinning);
        app.handle_event(key('q'));
        assert!(!app.is_running());
    }

    #[test]
    fn test_mouse_drag_orbits_and_reset_restores() {
        let mut app = app();
        let start = app.camera().position();
        app.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), 10, 10));
        app.handle_event(mouse(MouseEventKind::Drag(MouseButton::Left), 20, 12));
        app.handle_event(mouse(MouseEventKind::Up(MouseButton::Left), 20, 12));
        assert_ne!(app.camera().position(), start);

        app.handle_event(key('0'));
        assert_eq!(app.camera().position(), start);
    }

    #[test]
    fn test_scroll_zooms_in() {
        let mut app = app();
        let before = (app.camera().position() - app.camera().target()).norm();
        app.handle_event(mouse(MouseEventKind::ScrollUp, 0, 0));
        let after = (app.camera().position() - app.camera().target()).norm();
        assert!((after - before * 0.9).abs() < 1e-3 * before);
    }

    #[test]
    fn test_resize_updates_surface_and_aspect() {
        let mut app = app();
        app.handle_event(Event::Resize(100, 25));
        assert_eq!(app.surface().width(), 100);
        assert!((app.camera().aspect_ratio() - 2.0).abs() < 1e-6);
    }
}
