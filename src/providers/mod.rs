//! Data sources for the galaxy tick feed.

mod galtick;
mod traits;

pub use galtick::GaltickSource;
pub use traits::{TickSource, TickSourceError};

#[cfg(test)]
pub use traits::MockTickSource;
