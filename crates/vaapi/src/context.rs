//! Parent context link.
//!
//! A surface may be associated with the decode/processing context it belongs
//! to. The surface stores only a `Weak` reference: the context owns its
//! surfaces, never the other way round.

use crate::backend::VaId;
use crate::composition::OverlayComposition;
use crate::error::SurfaceResult;

pub type ContextId = VaId;

/// A context that can take over overlay composition for its surfaces.
pub trait ParentContext: Send + Sync {
    fn id(&self) -> ContextId;

    /// Apply (or, with `None`, clear) an overlay composition on every surface
    /// of the context.
    fn apply_composition(&self, composition: Option<&OverlayComposition>) -> SurfaceResult<()>;
}
