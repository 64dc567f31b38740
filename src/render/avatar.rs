//! Avatar registry and per-frame animation images

use std::collections::HashMap;

use tracing::debug;

use crate::assets::{AssetLoader, Pixmap};
use crate::net::protocol::{AvatarDef, Facing};
use crate::render::surface::Surface;

/// Logical on-screen size of one avatar frame
pub const FRAME_SIZE: u32 = 32;

/// One avatar: animation frame slots per authored facing. Slots fill in as
/// their loads complete; an empty slot is a valid transient state.
pub struct Avatar {
    generation: u64,
    frames: HashMap<Facing, Vec<Option<Pixmap>>>,
}

impl Avatar {
    /// Look up a loaded frame, if any
    pub fn frame(&self, facing: Facing, index: usize) -> Option<&Pixmap> {
        self.frames.get(&facing)?.get(index)?.as_ref()
    }

    /// Draw one animation frame as a [`FRAME_SIZE`] square centered on
    /// (x, y). Mirroring substitutes the east frame row and flips the draw
    /// about the avatar's own vertical axis. A frame that has not loaded
    /// yet, or an out-of-range index, is a silent no-op.
    pub fn draw(
        &self,
        surface: &mut Surface,
        x: f32,
        y: f32,
        facing: Facing,
        index: usize,
        mirror: bool,
    ) {
        let resolved = if mirror { Facing::East } else { facing };
        if let Some(frame) = self.frame(resolved, index) {
            surface.draw_sprite(frame, x, y, FRAME_SIZE, mirror);
        }
    }
}

/// All avatars known to the session, keyed by name
pub struct AvatarSet {
    avatars: HashMap<String, Avatar>,
    loader: AssetLoader,
    next_generation: u64,
}

impl AvatarSet {
    pub fn new(loader: AssetLoader) -> Self {
        Self {
            avatars: HashMap::new(),
            loader,
            next_generation: 0,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Avatar> {
        self.avatars.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.avatars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.avatars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.avatars.is_empty()
    }

    /// Drop every avatar. In-flight loads for the old set are discarded by
    /// the generation check when they complete.
    pub fn clear(&mut self) {
        self.avatars.clear();
    }

    /// Create an avatar from its definition and start loading every frame.
    /// Frame rows with unrecognized facing keys are skipped. Returns the
    /// registration generation its frame loads are tagged with.
    pub fn register(&mut self, name: &str, def: &AvatarDef) -> u64 {
        self.next_generation += 1;
        let generation = self.next_generation;

        let mut frames = HashMap::new();
        for (key, sources) in &def.frames {
            let Some(facing) = Facing::from_key(key) else {
                debug!(avatar = %name, key = %key, "Skipping unrecognized facing key");
                continue;
            };
            frames.insert(facing, vec![None; sources.len()]);
            for (index, source) in sources.iter().enumerate() {
                self.loader.load_frame(name, generation, facing, index, source);
            }
        }

        self.avatars.insert(
            name.to_string(),
            Avatar { generation, frames },
        );
        generation
    }

    /// Store a finished frame load. Completions for a since-replaced avatar
    /// carry a stale generation and are dropped.
    pub fn insert_frame(
        &mut self,
        name: &str,
        generation: u64,
        facing: Facing,
        index: usize,
        image: Pixmap,
    ) {
        let Some(avatar) = self.avatars.get_mut(name) else {
            debug!(avatar = %name, "Dropping frame for unknown avatar");
            return;
        };
        if avatar.generation != generation {
            debug!(avatar = %name, "Dropping stale frame load");
            return;
        }
        if let Some(slot) = avatar
            .frames
            .get_mut(&facing)
            .and_then(|row| row.get_mut(index))
        {
            *slot = Some(image);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ClientEvent;
    use tokio::sync::mpsc;

    fn def_with_east_frames(count: usize) -> AvatarDef {
        AvatarDef {
            name: "walker".to_string(),
            frames: HashMap::from([(
                "east".to_string(),
                (0..count).map(|i| format!("walker-e{i}.png")).collect(),
            )]),
        }
    }

    fn avatar_set() -> (AvatarSet, mpsc::Receiver<ClientEvent>) {
        let (tx, rx) = mpsc::channel(16);
        (AvatarSet::new(AssetLoader::new("assets", tx)), rx)
    }

    #[test]
    fn unloaded_frame_draw_is_a_noop() {
        tokio_test::block_on(async {
            let (mut avatars, _rx) = avatar_set();
            avatars.register("walker", &def_with_east_frames(2));

            let mut surface = Surface::new(64, 64);
            surface.clear([5, 5, 5, 255]);
            let before = surface.data().to_vec();

            let avatar = avatars.get("walker").unwrap();
            avatar.draw(&mut surface, 32.0, 32.0, Facing::East, 0, false);
            // Out-of-range index is equally silent
            avatar.draw(&mut surface, 32.0, 32.0, Facing::East, 99, false);
            // A facing with no authored row at all
            avatar.draw(&mut surface, 32.0, 32.0, Facing::North, 0, false);

            assert_eq!(surface.data(), &before[..]);
        });
    }

    #[test]
    fn west_draw_mirrors_the_east_frame() {
        tokio_test::block_on(async {
            let (mut avatars, _rx) = avatar_set();
            let generation = avatars.register("walker", &def_with_east_frames(1));

            let mut frame = Pixmap::new(2, 2);
            frame.fill([0, 0, 255, 255]);
            frame.set_pixel(0, 0, [255, 0, 0, 255]);
            frame.set_pixel(0, 1, [255, 0, 0, 255]);
            avatars.insert_frame("walker", generation, Facing::East, 0, frame);

            let mut east = Surface::new(64, 64);
            let mut west = Surface::new(64, 64);
            let avatar = avatars.get("walker").unwrap();
            avatar.draw(&mut east, 32.0, 32.0, Facing::East, 0, false);
            avatar.draw(&mut west, 32.0, 32.0, Facing::West, 0, true);

            let x0 = 32 - FRAME_SIZE / 2;
            let y0 = 32 - FRAME_SIZE / 2;
            for dy in 0..FRAME_SIZE {
                for dx in 0..FRAME_SIZE {
                    assert_eq!(
                        east.pixel(x0 + dx, y0 + dy),
                        west.pixel(x0 + (FRAME_SIZE - 1 - dx), y0 + dy),
                    );
                }
            }
        });
    }

    #[test]
    fn stale_generation_frames_are_discarded() {
        tokio_test::block_on(async {
            let (mut avatars, _rx) = avatar_set();
            let first_generation = avatars.register("walker", &def_with_east_frames(1));

            // Re-registration replaces the avatar and bumps the generation
            let current = avatars.register("walker", &def_with_east_frames(1));
            assert_ne!(first_generation, current);

            let mut frame = Pixmap::new(1, 1);
            frame.fill([255, 255, 255, 255]);
            avatars.insert_frame("walker", first_generation, Facing::East, 0, frame.clone());
            assert!(avatars.get("walker").unwrap().frame(Facing::East, 0).is_none());

            avatars.insert_frame("walker", current, Facing::East, 0, frame);
            assert!(avatars.get("walker").unwrap().frame(Facing::East, 0).is_some());
        });
    }

    #[test]
    fn frames_for_unknown_avatars_are_dropped() {
        tokio_test::block_on(async {
            let (mut avatars, _rx) = avatar_set();
            avatars.insert_frame("ghost", 1, Facing::South, 0, Pixmap::new(1, 1));
            assert!(avatars.is_empty());
        });
    }
}
