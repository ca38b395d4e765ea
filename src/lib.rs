// Library interface for the CLI and integration tests

pub mod catalog_draft;
pub mod client;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod launcher;
pub mod model;
pub mod notify;
pub mod player;
pub mod registry;
pub mod schedule;
pub mod sequence;
pub mod slide_draft;
pub mod surface;

pub use client::{ApiClient, ApiError, SlideSource};
pub use player::{Player, PlayerError, RotationSession};
