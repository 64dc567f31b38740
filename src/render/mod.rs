//! Frame composition modules

pub mod avatar;
pub mod pipeline;
pub mod surface;
pub mod text;
pub mod world;

pub use avatar::AvatarSet;
pub use pipeline::RenderPipeline;
pub use surface::Surface;
pub use world::WorldView;
