//! `vs-common` — Shared types, configuration, and errors for the VA surface core.
//!
//! This crate holds everything that is independent of the acceleration
//! backend:
//!
//! - **Color**: `VideoFormat`, `ChromaType`
//! - **Types**: `Resolution`, `Rectangle`
//! - **Video info**: `VideoInfo` (per-plane strides/offsets)
//! - **Config**: `VaapiConfig`, `DeassociatePolicy` (serde-based)
//! - **Errors**: `ConfigError` (thiserror-based)

pub mod color;
pub mod config;
pub mod error;
pub mod types;
pub mod video_info;

// Re-export commonly used items at crate root
pub use color::{ChromaType, VideoFormat};
pub use config::{DeassociatePolicy, VaapiConfig, DEFAULT_RENDER_NODE};
pub use error::{ConfigError, ConfigResult};
pub use types::{Rectangle, Resolution};
pub use video_info::{VideoInfo, MAX_PLANES};
