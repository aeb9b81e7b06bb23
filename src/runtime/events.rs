//! VM lifecycle event listeners.

use super::code_cache::{CodeCache, CompiledArtifact, InstalledCode};
use crate::core::error::CiResult;

/// Receives runtime lifecycle events.
///
/// Every method defaults to doing nothing. A failing listener stops the
/// broadcast and its error is returned to whoever triggered the event.
pub trait VmEventListener: Send + Sync {
    /// Code was successfully installed into `code_cache`.
    fn notify_install(
        &self,
        _code_cache: &CodeCache,
        _installed: &InstalledCode,
        _artifact: &CompiledArtifact,
    ) -> CiResult<()> {
        Ok(())
    }

    /// The VM is shutting down.
    fn notify_shutdown(&self) -> CiResult<()> {
        Ok(())
    }

    /// The VM finished bootstrapping.
    fn notify_bootstrap_finished(&self) -> CiResult<()> {
        Ok(())
    }
}
