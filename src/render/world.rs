//! World image and camera viewport

use crate::assets::Pixmap;
use crate::render::surface::Surface;

/// Camera rectangle in world coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Clamp a viewport origin so the camera stays inside the world on both
/// axes. An axis where the viewport exceeds the world clamps to 0.
pub fn compute_viewport(
    focal_x: f32,
    focal_y: f32,
    viewport_w: f32,
    viewport_h: f32,
    world_w: f32,
    world_h: f32,
) -> (f32, f32) {
    let vx = (focal_x - viewport_w / 2.0).clamp(0.0, (world_w - viewport_w).max(0.0));
    let vy = (focal_y - viewport_h / 2.0).clamp(0.0, (world_h - viewport_h).max(0.0));
    (vx, vy)
}

/// Owns the background world image and the camera rectangle
pub struct WorldView {
    world: Option<Pixmap>,
    viewport: Viewport,
}

impl WorldView {
    pub fn new(viewport_w: u32, viewport_h: u32) -> Self {
        Self {
            world: None,
            viewport: Viewport {
                x: 0.0,
                y: 0.0,
                width: viewport_w as f32,
                height: viewport_h as f32,
            },
        }
    }

    /// Whether the world image has loaded; rendering is disabled until then
    pub fn is_ready(&self) -> bool {
        self.world.is_some()
    }

    pub fn set_world(&mut self, image: Pixmap) {
        self.world = Some(image);
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        self.viewport.width = width as f32;
        self.viewport.height = height as f32;
    }

    /// Re-derive the camera from the latest focal point. The world bounds
    /// are unknown until the world image loads, so this is a no-op before
    /// then; callers refocus again once it arrives.
    pub fn focus(&mut self, focal_x: f32, focal_y: f32) {
        let Some(world) = &self.world else {
            return;
        };
        let (vx, vy) = compute_viewport(
            focal_x,
            focal_y,
            self.viewport.width,
            self.viewport.height,
            world.width as f32,
            world.height as f32,
        );
        self.viewport.x = vx;
        self.viewport.y = vy;
    }

    /// Translate world coordinates into surface coordinates
    pub fn world_to_screen(&self, wx: f32, wy: f32) -> (f32, f32) {
        (wx - self.viewport.x, wy - self.viewport.y)
    }

    /// Blit the viewport-cropped world image across the whole surface.
    /// A viewport larger than the world image degrades to a clipped copy.
    pub fn draw_background(&self, surface: &mut Surface) {
        let Some(world) = &self.world else {
            return;
        };
        surface.blit(
            world,
            self.viewport.x.floor() as i64,
            self.viewport.y.floor() as i64,
            0,
            0,
            surface.width(),
            surface.height(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_to_world_bounds() {
        // Local player near the top-right corner of a 2048x2048 world
        let (vx, vy) = compute_viewport(1900.0, 50.0, 800.0, 600.0, 2048.0, 2048.0);
        assert_eq!((vx, vy), (1248.0, 0.0));
    }

    #[test]
    fn centers_the_focal_point_when_there_is_room() {
        let (vx, vy) = compute_viewport(1024.0, 1024.0, 800.0, 600.0, 2048.0, 2048.0);
        assert_eq!((vx, vy), (624.0, 724.0));
    }

    #[test]
    fn oversized_viewport_clamps_to_origin() {
        let (vx, vy) = compute_viewport(10.0, 150.0, 800.0, 600.0, 400.0, 300.0);
        assert_eq!((vx, vy), (0.0, 0.0));
    }

    #[test]
    fn world_to_screen_subtracts_the_viewport_origin() {
        let mut view = WorldView::new(100, 100);
        view.set_world(Pixmap::new(400, 400));
        view.focus(200.0, 200.0);
        assert_eq!(view.viewport().x, 150.0);
        assert_eq!(view.world_to_screen(200.0, 200.0), (50.0, 50.0));
    }

    #[test]
    fn focus_before_world_load_keeps_the_origin() {
        let mut view = WorldView::new(100, 100);
        view.focus(500.0, 500.0);
        assert_eq!(view.viewport().x, 0.0);
        assert_eq!(view.viewport().y, 0.0);
        assert!(!view.is_ready());
    }

    #[test]
    fn resize_recomputes_against_new_size() {
        let mut view = WorldView::new(100, 100);
        view.set_world(Pixmap::new(400, 400));
        view.focus(390.0, 390.0);
        assert_eq!(view.viewport().x, 300.0);
        view.set_viewport_size(200, 200);
        view.focus(390.0, 390.0);
        assert_eq!(view.viewport().x, 200.0);
    }
}
