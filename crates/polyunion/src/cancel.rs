use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Result, UnionError};

/// Cooperative cancellation flag shared between a caller and running unions.
///
/// Clones share the same flag. The sweep polls it between events and the
/// reduction driver between pairwise steps.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self { Self::default() }

    /// Request cancellation; running work stops at its next check.
    pub fn cancel(&self) { self.0.store(true, Ordering::Relaxed); }

    pub fn is_cancelled(&self) -> bool { self.0.load(Ordering::Relaxed) }

    /// `Err(UnionError::Cancelled)` once cancellation has been requested.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() { Err(UnionError::Cancelled) } else { Ok(()) }
    }
}
