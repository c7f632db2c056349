/// Router Module Index
///
/// Organizes the routing into access-segregated modules. Access control is
/// applied at the module level (via Axum layers) so no admin endpoint can be
/// mounted without the session check.

/// Read-only catalog for the public site. No authentication.
pub mod public;

/// Session lifecycle: the shell's navigation check and logout.
pub mod session;

/// Back-office CRUD, wrapped in the session-check middleware.
pub mod admin;
