//! Shared VA display: backend connection plus the device-wide lock.
//!
//! A [`Display`] is cheap to clone and shared by every surface, image and
//! subpicture created on it. All backend calls go through [`Display::lock`],
//! which returns a scoped guard; the lock is released when the guard drops,
//! on every exit path. Callers hold it for one backend call at a time.

use std::ops::Deref;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tracing::info;
use vs_common::VaapiConfig;

use crate::backend::VaBackend;
use crate::error::LoadError;
use crate::native::NativeBackend;

struct DisplayInner {
    backend: Arc<dyn VaBackend>,
    lock: Mutex<()>,
    config: VaapiConfig,
}

/// Handle to a VA display connection.
#[derive(Clone)]
pub struct Display {
    inner: Arc<DisplayInner>,
}

impl Display {
    /// Wrap a backend with the default configuration.
    pub fn new(backend: Arc<dyn VaBackend>) -> Self {
        Self::with_config(backend, VaapiConfig::default())
    }

    pub fn with_config(backend: Arc<dyn VaBackend>, config: VaapiConfig) -> Self {
        Self {
            inner: Arc::new(DisplayInner {
                backend,
                lock: Mutex::new(()),
                config,
            }),
        }
    }

    /// Open a hardware display on the configured DRM render node.
    pub fn open(config: &VaapiConfig) -> Result<Self, LoadError> {
        let backend = NativeBackend::open(config)?;
        info!(
            render_node = %config.render_node.display(),
            vendor = %backend.vendor(),
            version = ?backend.version(),
            "VA display opened"
        );
        Ok(Self::with_config(Arc::new(backend), config.clone()))
    }

    /// Acquire the device lock for one backend call.
    pub fn lock(&self) -> DisplayLock<'_> {
        DisplayLock {
            _guard: self.inner.lock.lock(),
            backend: &*self.inner.backend,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.inner.lock.is_locked()
    }

    pub fn config(&self) -> &VaapiConfig {
        &self.inner.config
    }

    pub fn backend_name(&self) -> &'static str {
        self.inner.backend.name()
    }

    /// Whether two handles refer to the same display connection.
    pub fn same_display(&self, other: &Display) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for Display {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Display")
            .field("backend", &self.backend_name())
            .field("render_node", &self.inner.config.render_node)
            .field("locked", &self.is_locked())
            .finish()
    }
}

/// Scoped device lock. Dereferences to the backend.
pub struct DisplayLock<'a> {
    _guard: MutexGuard<'a, ()>,
    backend: &'a (dyn VaBackend + 'static),
}

impl Deref for DisplayLock<'_> {
    type Target = dyn VaBackend;

    fn deref(&self) -> &Self::Target {
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::software::SoftwareBackend;

    #[test]
    fn lock_is_scoped() {
        let display = Display::new(Arc::new(SoftwareBackend::new()));
        {
            let va = display.lock();
            assert!(display.is_locked());
            assert_eq!(va.name(), "software");
        }
        assert!(!display.is_locked());
    }

    #[test]
    fn clones_share_connection() {
        let display = Display::new(Arc::new(SoftwareBackend::new()));
        let other = display.clone();
        assert!(display.same_display(&other));

        let separate = Display::new(Arc::new(SoftwareBackend::new()));
        assert!(!display.same_display(&separate));
    }

    #[test]
    fn carries_config() {
        let config = VaapiConfig {
            deassociate_policy: vs_common::DeassociatePolicy::IgnoreFailure,
            ..VaapiConfig::default()
        };
        let display = Display::with_config(Arc::new(SoftwareBackend::new()), config.clone());
        assert_eq!(display.config(), &config);
        assert!(format!("{display:?}").contains("software"));
    }
}
