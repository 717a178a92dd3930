//! Header sets the identity provider and course server expect.

pub const USER_AGENT: &str = "Mozilla/5.0";

/// `Accept` sent with plain page loads.
pub const ACCEPT_PAGE: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// `Accept` sent with form submissions during the handshake.
pub const ACCEPT_FORM: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8";

/// `Accept` sent with the archive confirmation form.
pub const ACCEPT_DOWNLOAD: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Headers for GET-style requests.
pub fn base() -> Vec<(String, String)> {
    vec![
        ("User-Agent".into(), USER_AGENT.into()),
        ("Accept".into(), ACCEPT_PAGE.into()),
    ]
}

/// Headers for POST-style requests (no `User-Agent`).
pub fn form() -> Vec<(String, String)> {
    vec![
        ("Content-Type".into(), FORM_URLENCODED.into()),
        ("Accept".into(), ACCEPT_FORM.into()),
    ]
}
