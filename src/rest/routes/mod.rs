//! REST route handlers.

pub mod assets;
pub mod health;
pub mod installer;
