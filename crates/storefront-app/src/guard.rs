//! Route guards.
//!
//! Pure decisions over a [`Session`] snapshot; the presentation layer
//! is responsible for acting on them.

use crate::session::Session;
use storefront_commerce::customer::Role;

/// What a guarded route should do for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Startup validation has not finished; render nothing yet.
    Wait,
    /// The session satisfies the route's requirements.
    Allow,
    /// No session; send the visitor to login.
    RedirectLogin,
    /// Signed in but lacking the required role; send home.
    RedirectHome,
}

/// Decide access for a route that requires a session and, optionally,
/// a specific role.
///
/// An unresolved session always yields [`GuardDecision::Wait`] so a
/// slow validation never flashes a redirect at a user who is actually
/// signed in.
pub fn guard_route(session: &Session, required_role: Option<Role>) -> GuardDecision {
    if !session.resolved {
        return GuardDecision::Wait;
    }
    let Some(role) = session.role() else {
        return GuardDecision::RedirectLogin;
    };
    match required_role {
        Some(required) if role != required => GuardDecision::RedirectHome,
        _ => GuardDecision::Allow,
    }
}
