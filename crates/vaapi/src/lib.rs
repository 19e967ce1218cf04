//! `vs-vaapi` — VA-API video surfaces.
//!
//! Manages the lifecycle of hardware video surfaces: allocation under
//! several strategies, CPU snapshot access, subpicture overlays,
//! synchronization, and ordered teardown.
//!
//! # Architecture
//!
//! Everything goes through the [`VaBackend`] trait. Two implementations
//! exist:
//!
//! - [`native::NativeBackend`] loads libva dynamically at runtime (no link
//!   time dependency), so the crate builds and runs on machines without a
//!   VA driver.
//! - [`software::SoftwareBackend`] emulates the driver in memory and records
//!   every call, for tests and headless environments.
//!
//! A [`Display`] wraps a backend with the device-wide lock. Surfaces, images
//! and subpictures hold a clone of their display and take the lock for each
//! backend call they make.
//!
//! ## Module Overview
//!
//! - [`ffi`] — Raw libva bindings and the dynamically loaded function table
//! - [`backend`] — Backend trait and request/descriptor types
//! - [`display`] — Shared display handle and scoped lock
//! - [`format`] — Format, chroma, flag and status translation
//! - [`surface`] — The surface and its operations
//! - [`image`], [`subpicture`], [`composition`], [`buffer_proxy`] —
//!   collaborators consumed by surfaces
//!
//! ## Usage
//!
//! ```ignore
//! use vs_common::{ChromaType, VaapiConfig};
//! use vs_vaapi::{Display, Surface};
//!
//! let display = Display::open(&VaapiConfig::default())?;
//! let surface = Surface::new(&display, ChromaType::Yuv420, 1920, 1080)?;
//! surface.sync()?;
//! let image = surface.derive_image()?;
//! ```

pub mod backend;
pub mod buffer_proxy;
pub mod composition;
pub mod context;
pub mod display;
pub mod error;
pub mod ffi;
pub mod format;
pub mod image;
pub mod native;
pub mod software;
pub mod subpicture;
pub mod surface;

pub use backend::{VaBackend, VaId, INVALID_ID};
pub use buffer_proxy::{BufferMemoryType, BufferProxy};
pub use composition::{OverlayComposition, OverlayRectangle};
pub use context::{ContextId, ParentContext};
pub use display::{Display, DisplayLock};
pub use error::{LoadError, SurfaceError, SurfaceResult, VaError, VaErrorKind};
pub use image::Image;
pub use software::SoftwareBackend;
pub use subpicture::{Subpicture, SubpictureFlags};
pub use surface::{AllocFlags, Surface, SurfaceStatus};
