use std::{
    collections::HashMap,
    fmt,
    str::FromStr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use jsonwebtoken::{DecodingKey, Validation, decode};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, LOGIN_ROUTE},
    error::{AdminError, AdminResult},
    models::{NavItem, User},
    repository::RepositoryState,
};

pub const ADMIN_ROLE: &str = "admin";

/// Entries of the admin navigation, in display order.
pub const NAV_ENTRIES: &[(&str, &str)] = &[
    ("/dashboard", "Dashboard"),
    ("/dashboard/players", "Players"),
    ("/dashboard/blogs", "Blogs"),
    ("/dashboard/videos", "Videos"),
    ("/dashboard/news", "News"),
    ("/dashboard/sponsors", "Sponsors"),
];

/// RolePolicy
///
/// What the shell does with the profile role of a signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RolePolicy {
    /// The role is read and reported but never blocks access.
    Advisory,
    /// Only users whose profile role is `admin` get in.
    Strict,
}

impl FromStr for RolePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "advisory" => Ok(RolePolicy::Advisory),
            "strict" => Ok(RolePolicy::Strict),
            other => Err(format!("unknown role policy `{other}` (expected advisory|strict)")),
        }
    }
}

impl fmt::Display for RolePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RolePolicy::Advisory => f.write_str("advisory"),
            RolePolicy::Strict => f.write_str("strict"),
        }
    }
}

// 1. AuthProvider Contract
/// AuthProvider
///
/// The authentication collaborator consulted by the admin shell.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolves the user behind a session token. `None` when the token is not a
    /// valid, unexpired session.
    async fn get_current_user(&self, token: &str) -> AdminResult<Option<User>>;

    /// Ends the session identified by the token.
    async fn sign_out(&self, token: &str) -> AdminResult<()>;

    /// Role claim of the user's profile, if a profile exists.
    async fn get_profile_role(&self, user_id: Uuid) -> AdminResult<Option<String>>;
}

pub type AuthState = Arc<dyn AuthProvider>;

/// Claims
///
/// The subset of the Supabase session JWT payload this service reads.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The auth user id.
    pub sub: Uuid,
    pub exp: usize,
    pub iat: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

// 2. The Real Implementation (Supabase)
/// SupabaseAuthProvider
///
/// Verifies session JWTs locally with the project's JWT secret, ends sessions via
/// the Supabase auth REST API and reads roles from the `profiles` table.
pub struct SupabaseAuthProvider {
    http: reqwest::Client,
    supabase_url: String,
    anon_key: String,
    jwt_secret: String,
    repo: RepositoryState,
}

impl SupabaseAuthProvider {
    pub fn new(config: &AppConfig, repo: RepositoryState) -> Self {
        Self {
            http: reqwest::Client::new(),
            supabase_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
            jwt_secret: config.jwt_secret.clone(),
            repo,
        }
    }
}

/// Decodes and verifies a session token against the shared secret.
pub fn verify_token(token: &str, secret: &str) -> Option<Claims> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    // Supabase sets `aud: authenticated`; the signature already binds the token to this project.
    validation.validate_aud = false;

    match decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            tracing::debug!(error = %e, "rejected session token");
            None
        }
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuthProvider {
    async fn get_current_user(&self, token: &str) -> AdminResult<Option<User>> {
        Ok(verify_token(token, &self.jwt_secret).map(|claims| User {
            id: claims.sub,
            email: claims.email,
        }))
    }

    async fn sign_out(&self, token: &str) -> AdminResult<()> {
        let url = format!("{}/auth/v1/logout", self.supabase_url);
        let response = self
            .http
            .post(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AdminError::AuthProvider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AdminError::AuthProvider(format!(
                "sign-out rejected with status {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn get_profile_role(&self, user_id: Uuid) -> AdminResult<Option<String>> {
        Ok(self.repo.get_profile_role(user_id).await?)
    }
}

// 3. The Static Implementation (For Tests)
/// StaticAuthProvider
///
/// An `AuthProvider` answering from fixed tables. Records every sign-out and
/// counts user lookups.
#[derive(Default)]
pub struct StaticAuthProvider {
    sessions: HashMap<String, User>,
    roles: HashMap<Uuid, String>,
    /// When true, role lookups fail as if the `profiles` table were missing.
    pub role_lookup_fails: bool,
    /// When true, `sign_out` fails as if the auth endpoint were unreachable.
    pub sign_out_fails: bool,
    signed_out: Mutex<Vec<String>>,
    lookups: AtomicUsize,
}

impl StaticAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(mut self, token: &str, user: User) -> Self {
        self.sessions.insert(token.to_string(), user);
        self
    }

    pub fn with_role(mut self, user_id: Uuid, role: &str) -> Self {
        self.roles.insert(user_id, role.to_string());
        self
    }

    pub fn signed_out(&self) -> Vec<String> {
        self.signed_out.lock().clone()
    }

    /// Number of `get_current_user` calls answered so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthProvider for StaticAuthProvider {
    async fn get_current_user(&self, token: &str) -> AdminResult<Option<User>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.sessions.get(token).cloned())
    }

    async fn sign_out(&self, token: &str) -> AdminResult<()> {
        if self.sign_out_fails {
            return Err(AdminError::AuthProvider("network down".to_string()));
        }
        self.signed_out.lock().push(token.to_string());
        Ok(())
    }

    async fn get_profile_role(&self, user_id: Uuid) -> AdminResult<Option<String>> {
        if self.role_lookup_fails {
            return Err(AdminError::AuthProvider("profiles unavailable".to_string()));
        }
        Ok(self.roles.get(&user_id).cloned())
    }
}

/// AdminSession
///
/// A user the shell has let through, with the outcome of the role check.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub user: User,
    pub role: Option<String>,
    pub is_admin: bool,
}

#[derive(Debug, Clone)]
pub enum SessionOutcome {
    /// The login route itself is never gated.
    Skipped,
    /// No signed-in user; go to the contained route.
    Redirect(String),
    Granted(AdminSession),
}

/// AdminShell
///
/// Gates the admin pages and supplies their navigation.
#[derive(Clone)]
pub struct AdminShell {
    auth: AuthState,
    policy: RolePolicy,
}

impl AdminShell {
    pub fn new(auth: AuthState, policy: RolePolicy) -> Self {
        Self { auth, policy }
    }

    /// check_session
    ///
    /// Resolves the session for a navigation to `path`. A failing user lookup is
    /// treated as "signed out". Once a user is known, the role is consulted and the
    /// policy decides whether anything but `admin` blocks.
    pub async fn check_session(&self, path: &str, token: Option<&str>) -> AdminResult<SessionOutcome> {
        if path == LOGIN_ROUTE {
            return Ok(SessionOutcome::Skipped);
        }

        let user = match token {
            Some(token) => self.auth.get_current_user(token).await.unwrap_or_else(|e| {
                tracing::warn!(error = %e, "user lookup failed, treating as signed out");
                None
            }),
            None => None,
        };

        match user {
            Some(user) => self.admit(user).await.map(SessionOutcome::Granted),
            None => Ok(SessionOutcome::Redirect(LOGIN_ROUTE.to_string())),
        }
    }

    /// Applies the role policy to an already identified user.
    pub async fn admit(&self, user: User) -> AdminResult<AdminSession> {
        let role = match self.auth.get_profile_role(user.id).await {
            Ok(role) => role,
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "profile role lookup failed");
                None
            }
        };
        let is_admin = role.as_deref() == Some(ADMIN_ROLE);

        if !is_admin {
            match self.policy {
                RolePolicy::Advisory => {
                    tracing::warn!(user_id = %user.id, ?role, "non-admin user admitted under advisory role policy");
                }
                RolePolicy::Strict => {
                    return Err(AdminError::Forbidden(format!(
                        "user {} does not have the admin role",
                        user.id
                    )));
                }
            }
        }

        Ok(AdminSession { user, role, is_admin })
    }

    /// Ends the session and returns where the client should go next. A failed
    /// sign-out is logged; the client is sent to the login route regardless.
    pub async fn logout(&self, token: &str) -> String {
        if let Err(e) = self.auth.sign_out(token).await {
            tracing::warn!(error = %e, "sign-out failed, redirecting to login anyway");
        }
        LOGIN_ROUTE.to_string()
    }

    /// The navigation list with the entry for `path` highlighted.
    pub fn navigation(path: &str) -> Vec<NavItem> {
        NAV_ENTRIES
            .iter()
            .map(|(href, label)| NavItem {
                href: href.to_string(),
                label: label.to_string(),
                active: *href == path,
            })
            .collect()
    }
}
