//! Federated (Shibboleth/SAML) login.
//!
//! The handshake is a fixed pipeline of five requests:
//!
//! 1. GET the course server's SSO entry point, expect a 302 to the provider.
//! 2. GET the provider's SAML endpoint, expect a redirect to its login path.
//! 3. POST (empty) to the login URL to obtain the form and its `csrf_token`.
//! 4. POST the credentials; a 200 page carries the signed assertion.
//! 5. POST the assertion form back to the course server, which sets the
//!    session cookies.
//!
//! Steps 1, 2 and 5 read the 3xx response themselves; 3 and 4 let the
//! transport follow redirects.

mod steps;

use std::fmt;

use crate::config::SsoConfig;
use crate::error::AuthError;
use crate::http::Session;

/// Username and password for the identity provider.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Runs the SSO handshake and returns a session holding the course server's
/// cookies. Blocks; run on a blocking thread from async code.
pub fn authenticate(sso: &SsoConfig, credentials: &Credentials) -> Result<Session, AuthError> {
    let session = Session::new(sso.transport_options());

    let saml_url = steps::initiate(&session, &sso.entry_url)?;
    tracing::debug!("SSO entry redirected to {}", saml_url);

    let sso_path = steps::idp_redirect(&session, &saml_url)?;
    let login_url = steps::resolve(&sso.idp_base_url, &sso_path)?;
    tracing::debug!("identity provider login at {}", login_url);

    let csrf_token = steps::fetch_login_page(&session, &login_url)?;

    let (relay_page, relay_url) =
        steps::submit_credentials(&session, &login_url, &csrf_token, credentials)?;
    tracing::info!(user = %credentials.username, "credentials accepted");

    steps::relay_assertion(&session, &relay_page, &relay_url)?;
    tracing::info!(cookies = session.cookies().len(), "authenticated");

    Ok(session)
}
