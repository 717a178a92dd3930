//! HTTP session: libcurl transport with a shared cookie store.
//!
//! Redirect handling is decided per request ([`Redirects`]) rather than by
//! any state inside the session, so requests issued after the handshake are
//! unaffected by how many requests came before them.

mod cookies;
pub mod headers;
mod request;
mod session;

pub use cookies::{Cookie, CookieJar};
pub use request::{Method, Redirects, Request, Response};
pub use session::{Session, TransportOptions};

/// Resolves `reference` (absolute, or relative like a `Location` header or a
/// form `action`) against `base`.
pub fn resolve_url(base: &str, reference: &str) -> Result<String, url::ParseError> {
    Ok(url::Url::parse(base)?.join(reference)?.to_string())
}
