//! Client coordinator: one task owns all mutable state
//!
//! Session mirror, camera, avatars and the render pipeline live behind a
//! single event queue, so mutation and rendering can never interleave.

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::assets::{AssetEvent, AssetLoader};
use crate::config::Config;
use crate::net::transport::TransportEvent;
use crate::render::avatar::AvatarSet;
use crate::render::pipeline::{FramePresenter, RenderPipeline};
use crate::render::text::LabelRenderer;
use crate::render::world::WorldView;
use crate::session::adapter::ProtocolAdapter;
use crate::session::state::SessionState;

/// Label font size in logical pixels
const LABEL_PX: f32 = 14.0;

/// Everything the client reacts to, funneled into one queue
#[derive(Debug)]
pub enum ClientEvent {
    Transport(TransportEvent),
    Asset(AssetEvent),
    /// The presentation surface changed size
    Resized { width: u32, height: u32 },
}

/// Top-level owner of session, camera, avatars and render pipeline
pub struct WorldClient {
    session: SessionState,
    adapter: ProtocolAdapter,
    avatars: AvatarSet,
    world: WorldView,
    pipeline: RenderPipeline,
}

impl WorldClient {
    pub fn new(
        config: &Config,
        outbound: mpsc::Sender<String>,
        loader: AssetLoader,
        presenter: Box<dyn FramePresenter>,
    ) -> Self {
        let labels = config.font_path.as_deref().and_then(|path| {
            match LabelRenderer::from_file(path, LABEL_PX) {
                Ok(labels) => Some(labels),
                Err(e) => {
                    warn!(path = %path, error = %e, "Label font unavailable, names disabled");
                    None
                }
            }
        });

        Self {
            session: SessionState::new(),
            adapter: ProtocolAdapter::new(config.username.clone(), outbound),
            avatars: AvatarSet::new(loader),
            world: WorldView::new(config.viewport_width, config.viewport_height),
            pipeline: RenderPipeline::new(
                config.viewport_width,
                config.viewport_height,
                labels,
                presenter,
            ),
        }
    }

    /// Run the event loop until every producer hangs up
    pub async fn run(mut self, mut events: mpsc::Receiver<ClientEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
        }
        info!("Event sources closed, client stopping");
    }

    async fn handle_event(&mut self, event: ClientEvent) {
        match event {
            ClientEvent::Transport(TransportEvent::Opened) => {
                self.adapter.handle_open(&mut self.session).await;
            }
            ClientEvent::Transport(TransportEvent::Inbound(text)) => {
                let outcome = self
                    .adapter
                    .apply(&text, &mut self.session, &mut self.avatars);
                if outcome.local_moved {
                    self.refocus();
                }
                if outcome.state_changed {
                    self.render();
                }
            }
            ClientEvent::Transport(TransportEvent::Closed) => {
                info!("Disconnected from world server");
                self.adapter.handle_close(&mut self.session);
            }
            ClientEvent::Transport(TransportEvent::Failed(reason)) => {
                error!(reason = %reason, "Transport failure");
                self.adapter.handle_close(&mut self.session);
            }
            ClientEvent::Asset(AssetEvent::World { image }) => {
                info!(width = image.width, height = image.height, "World image ready");
                self.world.set_world(image);
                self.refocus();
                self.render();
            }
            ClientEvent::Asset(AssetEvent::Frame {
                avatar,
                generation,
                facing,
                index,
                image,
            }) => {
                self.avatars
                    .insert_frame(&avatar, generation, facing, index, image);
                self.render();
            }
            ClientEvent::Resized { width, height } => {
                debug!(width, height, "Surface resized");
                self.pipeline.resize(width, height);
                self.world.set_viewport_size(width, height);
                self.refocus();
                self.render();
            }
        }
    }

    /// Re-derive the camera from the local player's latest position
    fn refocus(&mut self) {
        if let Some(player) = self.session.local_player() {
            let (x, y) = (player.x, player.y);
            self.world.focus(x, y);
        }
    }

    fn render(&mut self) {
        self.pipeline
            .render_frame(&self.world, &self.session, &self.avatars);
    }
}
