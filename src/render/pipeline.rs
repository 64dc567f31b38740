//! Frame composition: background, avatars, name labels

use crate::net::protocol::Facing;
use crate::render::avatar::AvatarSet;
use crate::render::surface::{Color, Surface};
use crate::render::text::LabelRenderer;
use crate::render::world::WorldView;
use crate::session::state::SessionState;

/// Players this far outside the surface are skipped entirely
const CULL_MARGIN: f32 = 50.0;
/// Vertical offset of the name label above the avatar anchor
const LABEL_OFFSET: f32 = 25.0;
const CLEAR_COLOR: Color = [0, 0, 0, 255];

/// Presentation hook invoked once per composed frame
pub trait FramePresenter: Send {
    fn present(&mut self, surface: &Surface);
}

/// Default presenter: frames stay in memory only
pub struct NullPresenter;

impl FramePresenter for NullPresenter {
    fn present(&mut self, _surface: &Surface) {}
}

/// Composes world, avatars and labels into visible frames
pub struct RenderPipeline {
    surface: Surface,
    labels: Option<LabelRenderer>,
    presenter: Box<dyn FramePresenter>,
}

impl RenderPipeline {
    pub fn new(
        width: u32,
        height: u32,
        labels: Option<LabelRenderer>,
        presenter: Box<dyn FramePresenter>,
    ) -> Self {
        Self {
            surface: Surface::new(width, height),
            labels,
            presenter,
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface.resize(width, height);
    }

    /// Compose one frame. A missing world image makes this a no-op; a
    /// missing avatar skips that player; a missing frame skips the draw.
    /// Nothing here mutates session state.
    pub fn render_frame(
        &mut self,
        world: &WorldView,
        session: &SessionState,
        avatars: &AvatarSet,
    ) {
        if !world.is_ready() {
            return;
        }

        self.surface.clear(CLEAR_COLOR);
        world.draw_background(&mut self.surface);

        let width = self.surface.width() as f32;
        let height = self.surface.height() as f32;
        for player in session.players() {
            let (sx, sy) = world.world_to_screen(player.x, player.y);
            if sx < -CULL_MARGIN
                || sx > width + CULL_MARGIN
                || sy < -CULL_MARGIN
                || sy > height + CULL_MARGIN
            {
                continue;
            }

            let Some(avatar) = avatars.get(&player.avatar) else {
                continue;
            };
            let mirror = player.facing == Facing::West;
            avatar.draw(
                &mut self.surface,
                sx,
                sy,
                player.facing,
                player.animation_frame,
                mirror,
            );

            if let Some(labels) = &self.labels {
                labels.draw(&mut self.surface, &player.username, sx, sy - LABEL_OFFSET);
            }
        }

        self.presenter.present(&self.surface);
    }
}
