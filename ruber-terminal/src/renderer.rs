//! ASCII rasterizer for terminal rendering
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix3, Matrix4};
use ruber_core::buffer::BufferVertex;
use ruber_core::{Camera, ModelBuffer, Transform};
use std::io::Write;

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Terminal cells are roughly twice as tall as they are wide.
pub const CELL_ASPECT: f32 = 2.0;

/// Screen-space vertex: column, row, normalized depth
type ScreenPoint = (f32, f32, f32);

/// ASCII renderer that converts model buffers to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    /// Aspect ratio of the drawable area in world units.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / (self.height.max(1) as f32 * CELL_ASPECT)
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::Reset);
    }

    /// Draw one model with its model matrix, filled or as triangle outlines.
    pub fn render_model(
        &mut self,
        buffer: &ModelBuffer,
        model_matrix: &Matrix4<f32>,
        camera: &Camera,
        wireframe: bool,
    ) {
        let view = camera.view_matrix();
        let model_view = view * model_matrix;
        let mvp = Transform::mvp_matrix(model_matrix, &view, &camera.projection_matrix());
        let normal_matrix = Matrix3::from_fn(|r, c| model_view[(r, c)]);

        for triangle in buffer.triangles() {
            self.render_triangle(&triangle, &mvp, &normal_matrix, wireframe);
        }
    }

    fn render_triangle(
        &mut self,
        triangle: &[BufferVertex; 3],
        mvp: &Matrix4<f32>,
        normal_matrix: &Matrix3<f32>,
        wireframe: bool,
    ) {
        // Project vertices to screen space
        let mut screen_coords = [(0.0, 0.0, 0.0); 3];
        for (slot, vertex) in screen_coords.iter_mut().zip(triangle) {
            match Camera::project_to_screen(mvp, &vertex.position, self.width as u32, self.height as u32) {
                Some(point) => *slot = point,
                None => return, // Triangle is clipped
            }
        }

        // Flat shading, lit from the eye. Lighting is two-sided.
        let brightness = (normal_matrix * triangle[0].normal)
            .try_normalize(f32::EPSILON)
            .map_or(0.5, |n| n.z.abs());

        // Map brightness to character
        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
        let character = LUMINOSITY_RAMP[char_index.min(LUMINOSITY_RAMP.len() - 1)];
        let color = shade(triangle[0].color, brightness);

        if wireframe {
            for (a, b) in [(0, 1), (1, 2), (2, 0)] {
                let bounds = (self.width as f32, self.height as f32);
                if let Some((from, to)) = clip_segment(screen_coords[a], screen_coords[b], bounds) {
                    self.draw_line(from, to, character, color);
                }
            }
        } else {
            self.rasterize_triangle(&screen_coords, character, color);
        }
    }

    fn rasterize_triangle(&mut self, coords: &[ScreenPoint; 3], character: char, color: Color) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        // Scanline rasterization
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                // Barycentric coordinates
                if let Some((w0, w1, w2)) = barycentric(
                    (v0.0, v0.1),
                    (v1.0, v1.1),
                    (v2.0, v2.1),
                    (px, py),
                ) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        // Interpolate depth
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                        self.plot(x, y, depth, character, color);
                    }
                }
            }
        }
    }

    /// Bresenham line with linearly interpolated depth
    fn draw_line(&mut self, from: ScreenPoint, to: ScreenPoint, character: char, color: Color) {
        let (mut x, mut y) = (from.0.floor() as i32, from.1.floor() as i32);
        let (x1, y1) = (to.0.floor() as i32, to.1.floor() as i32);
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let steps = dx.max(-dy).max(1) as f32;
        let mut err = dx + dy;
        let mut step = 0.0;

        loop {
            let depth = from.2 + (to.2 - from.2) * (step / steps);
            self.plot(x, y, depth, character, color);
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
            step += 1.0;
        }
    }

    fn plot(&mut self, x: i32, y: i32, depth: f32, character: char, color: Color) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        if depth < self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            self.char_buffer[idx] = character;
            self.color_buffer[idx] = color;
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current = None;
        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, y as u16))?;
            for x in 0..self.width {
                let idx = y * self.width + x;
                let color = self.color_buffer[idx];
                if current != Some(color) {
                    writer.queue(SetForegroundColor(color))?;
                    current = Some(color);
                }
                writer.queue(Print(self.char_buffer[idx]))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }

    #[cfg(test)]
    fn cell(&self, x: usize, y: usize) -> char {
        self.char_buffer[y * self.width + x]
    }

    #[cfg(test)]
    fn filled(&self) -> usize {
        self.char_buffer.iter().filter(|c| **c != ' ').count()
    }
}

/// Diffuse colour dimmed by the light falling on the surface
fn shade(color: [f32; 4], brightness: f32) -> Color {
    let level = 0.3 + 0.7 * brightness.clamp(0.0, 1.0);
    let channel = |c: f32| (c.clamp(0.0, 1.0) * level * 255.0).round() as u8;
    Color::Rgb {
        r: channel(color[0]),
        g: channel(color[1]),
        b: channel(color[2]),
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

/// Liang-Barsky clip of a screen segment to `[0, width) x [0, height)`.
fn clip_segment(from: ScreenPoint, to: ScreenPoint, (width, height): (f32, f32)) -> Option<(ScreenPoint, ScreenPoint)> {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let max_x = (width - 1e-3).max(0.0);
    let max_y = (height - 1e-3).max(0.0);
    let (mut t0, mut t1) = (0.0_f32, 1.0_f32);

    for (p, q) in [(-dx, from.0), (dx, max_x - from.0), (-dy, from.1), (dy, max_y - from.1)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }

    let at = |t: f32| {
        (
            from.0 + dx * t,
            from.1 + dy * t,
            from.2 + (to.2 - from.2) * t,
        )
    };
    Some((at(t0), at(t1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Vector3};
    use ruber_core::Mesh;

    fn camera_facing_cube(width: usize, height: usize) -> Camera {
        let mut camera = Camera::new(width as u32, height as u32);
        camera.look(Point3::new(0.0, 0.0, 6.0), Point3::origin(), Vector3::y());
        camera.set_aspect(width as f32 / (height as f32 * CELL_ASPECT));
        camera
    }

    #[test]
    fn test_barycentric_inside_and_outside() {
        let inside = barycentric((0.0, 0.0), (4.0, 0.0), (0.0, 4.0), (1.0, 1.0)).unwrap();
        assert!(inside.0 >= 0.0 && inside.1 >= 0.0 && inside.2 >= 0.0);
        let outside = barycentric((0.0, 0.0), (4.0, 0.0), (0.0, 4.0), (5.0, 5.0)).unwrap();
        assert!(outside.0 < 0.0 || outside.1 < 0.0 || outside.2 < 0.0);
        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (1.0, 1.0)).is_none());
    }

    #[test]
    fn test_cube_covers_center() {
        let mut renderer = AsciiRenderer::new(80, 40);
        let buffer = ModelBuffer::from_mesh(&Mesh::cube(2.0));
        let camera = camera_facing_cube(80, 40);
        renderer.render_model(&buffer, &Matrix4::identity(), &camera, false);

        // The front face looks straight at the eye and gets the brightest glyph.
        assert_eq!(renderer.cell(40, 20), '@');
        assert_eq!(renderer.cell(0, 0), ' ');
    }

    #[test]
    fn test_close_model_crossing_screen_edges_is_drawn() {
        // Every corner of this cube projects off screen.
        let buffer = ModelBuffer::from_mesh(&Mesh::cube(8.0));
        let camera = camera_facing_cube(80, 40);

        let mut filled = AsciiRenderer::new(80, 40);
        filled.render_model(&buffer, &Matrix4::identity(), &camera, false);
        assert_eq!(filled.cell(40, 20), '@');
        assert_eq!(filled.cell(0, 0), '@');

        let mut outline = AsciiRenderer::new(80, 40);
        outline.render_model(&buffer, &Matrix4::identity(), &camera, true);
        assert!(outline.filled() > 0);
    }

    #[test]
    fn test_clip_segment() {
        let (from, to) = clip_segment((-10.0, 5.0, 0.0), (30.0, 5.0, 1.0), (20.0, 10.0)).unwrap();
        assert_eq!(from.0, 0.0);
        assert!((from.2 - 0.25).abs() < 1e-6);
        assert!(to.0 < 20.0 && to.0 > 19.9);
        assert!(clip_segment((-10.0, -5.0, 0.0), (30.0, -5.0, 0.0), (20.0, 10.0)).is_none());
    }

    #[test]
    fn test_wireframe_draws_less_than_fill() {
        let buffer = ModelBuffer::from_mesh(&Mesh::cube(2.0));
        let camera = camera_facing_cube(80, 40);

        let mut filled = AsciiRenderer::new(80, 40);
        filled.render_model(&buffer, &Matrix4::identity(), &camera, false);
        let mut outline = AsciiRenderer::new(80, 40);
        outline.render_model(&buffer, &Matrix4::identity(), &camera, true);

        assert!(outline.filled() > 0);
        assert!(outline.filled() < filled.filled());
    }

    #[test]
    fn test_model_behind_camera_is_skipped() {
        let mut renderer = AsciiRenderer::new(40, 20);
        let buffer = ModelBuffer::from_mesh(&Mesh::cube(2.0));
        let camera = camera_facing_cube(40, 20);
        let behind = Matrix4::new_translation(&Vector3::new(0.0, 0.0, 20.0));
        renderer.render_model(&buffer, &behind, &camera, false);
        assert_eq!(renderer.filled(), 0);
    }

    #[test]
    fn test_clear_and_draw() {
        let mut renderer = AsciiRenderer::new(8, 4);
        renderer.plot(1, 1, 0.0, '#', Color::Red);
        renderer.plot(1, 1, 0.5, '.', Color::Blue);
        assert_eq!(renderer.cell(1, 1), '#');

        let mut out = Vec::new();
        renderer.draw(&mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains('#'));

        renderer.clear();
        assert_eq!(renderer.filled(), 0);
    }

    #[test]
    fn test_shade_scales_color() {
        assert_eq!(shade([1.0, 0.5, 0.0, 1.0], 1.0), Color::Rgb { r: 255, g: 128, b: 0 });
        assert_eq!(shade([1.0, 1.0, 1.0, 1.0], 0.0), Color::Rgb { r: 77, g: 77, b: 77 });
    }

    #[test]
    fn test_aspect_accounts_for_cells() {
        let renderer = AsciiRenderer::new(80, 20);
        assert!((renderer.aspect() - 2.0).abs() < 1e-6);
    }
}
