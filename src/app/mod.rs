//! Client coordination

pub mod client;

pub use client::{ClientEvent, WorldClient};
