//! Call-chain-local scope markers.
//!
//! The marker lives in a tokio task-local, so independent tasks each see
//! their own state, and it is released when the scoped future completes or
//! is dropped. Command scopes refuse to start while any marker is set; query
//! scopes never refuse.

use std::future::Future;
use tracing::debug;
use uuid::Uuid;

tokio::task_local! {
    static ACTIVE_SCOPE: ScopeMarker;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Command,
    Query,
}

/// Innermost scope of the current call chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeMarker {
    pub id: Uuid,
    pub kind: ScopeKind,
    /// Set when this scope or one of its parents is a command scope.
    pub within_command: bool,
}

/// Innermost scope marker of the current call chain, if any.
pub fn current_scope() -> Option<ScopeMarker> {
    ACTIVE_SCOPE.try_with(|marker| *marker).ok()
}

/// Returns true when any unit-of-work scope is active in this call chain.
pub fn is_scope_active() -> bool {
    current_scope().is_some()
}

/// Returns true when the current call chain is inside a command scope,
/// including from a query scope nested in it.
pub fn is_command_scope_active() -> bool {
    current_scope().is_some_and(|marker| marker.within_command)
}

/// Run `fut` with a scope marker of the given kind set.
pub(crate) async fn enter<F>(id: Uuid, kind: ScopeKind, fut: F) -> F::Output
where
    F: Future,
{
    let within_command = kind == ScopeKind::Command || is_command_scope_active();
    let marker = ScopeMarker {
        id,
        kind,
        within_command,
    };
    debug!(scope_id = %id, kind = ?kind, within_command, "Entering unit-of-work scope");
    ACTIVE_SCOPE.scope(marker, fut).await
}
