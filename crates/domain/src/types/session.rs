//! Session lifecycle events

use serde::{Deserialize, Serialize};

/// Transitions of the signed-in session, broadcast to the application layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    /// A credential was stored after sign-in.
    SignedIn,
    /// The credential was rotated by a successful refresh.
    Refreshed,
    /// The refresh endpoint rejected the refresh token; the user must sign in
    /// again.
    Expired,
    /// The credential was deleted (logout or storage clear).
    SignedOut,
}
