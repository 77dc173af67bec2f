//! Integration layer - the outbound side of the transport boundary.

pub mod bot;

pub use bot::{Bot, BoxedBot, MessageRef};
