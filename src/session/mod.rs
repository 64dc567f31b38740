//! Session state mirroring and protocol application

pub mod adapter;
pub mod state;

pub use adapter::{ApplyOutcome, ProtocolAdapter};
pub use state::{ConnectionPhase, Player, SessionState};
