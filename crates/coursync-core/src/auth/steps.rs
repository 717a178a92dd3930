//! The five handshake steps, in order. Each takes the session and what the
//! previous step produced.

use super::Credentials;
use crate::error::AuthError;
use crate::html::{extract_form, find_input_value, FormScope, FormSubmission};
use crate::http::{headers, resolve_url, Redirects, Request, Session};

pub(crate) const CSRF_FIELD: &str = "csrf_token";
pub(crate) const USERNAME_FIELD: &str = "j_username";
pub(crate) const PASSWORD_FIELD: &str = "j_password";
const DO_NOT_CACHE_FIELD: &str = "donotcache";
const PROCEED_FIELD: &str = "_eventId_proceed";

/// Step 1: the entry URL must answer 302; returns the absolute `Location`.
pub(crate) fn initiate(session: &Session, entry_url: &str) -> Result<String, AuthError> {
    let resp = session.send(
        &Request::get(entry_url)
            .headers(headers::base())
            .redirects(Redirects::Manual),
    )?;
    let location = match (resp.status, resp.location()) {
        (302, Some(location)) => location,
        (status, _) => return Err(AuthError::UnexpectedResponse { status }),
    };
    resolve(entry_url, location)
}

/// Step 2: the provider's SAML endpoint redirects to its login path.
/// Returns the raw (provider-relative) `Location`.
pub(crate) fn idp_redirect(session: &Session, saml_url: &str) -> Result<String, AuthError> {
    let resp = session.send(
        &Request::get(saml_url)
            .headers(headers::base())
            .redirects(Redirects::Manual),
    )?;
    resp.location()
        .map(str::to_string)
        .ok_or(AuthError::MissingSsoUrl)
}

/// Step 3: an empty POST to the login URL returns the login form; returns
/// its anti-forgery token.
pub(crate) fn fetch_login_page(session: &Session, login_url: &str) -> Result<String, AuthError> {
    let resp = session.send(
        &Request::post(login_url)
            .headers(headers::form())
            .redirects(Redirects::Follow),
    )?;
    find_input_value(&resp.text(), CSRF_FIELD)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingCsrfToken)
}

/// Step 4: submit the credentials. Returns the 200 page carrying the SAML
/// assertion form, and the URL it was served from.
pub(crate) fn submit_credentials(
    session: &Session,
    login_url: &str,
    csrf_token: &str,
    credentials: &Credentials,
) -> Result<(String, String), AuthError> {
    let body = credential_form(csrf_token, credentials).encode();
    let resp = session.send(
        &Request::post(login_url)
            .headers(headers::form())
            .body(body)
            .redirects(Redirects::Follow),
    )?;
    if resp.status != 200 {
        return Err(AuthError::LoginRejected {
            status: resp.status,
        });
    }
    Ok((resp.text().into_owned(), resp.effective_url))
}

/// Step 5: relay the assertion to the course server. The cookies this POST
/// yields are the session; the response itself is not inspected.
pub(crate) fn relay_assertion(session: &Session, page: &str, page_url: &str) -> Result<(), AuthError> {
    let form = extract_form(page, FormScope::FirstContainer);
    if form.is_empty() {
        return Err(AuthError::MissingAssertionForm);
    }
    let action = resolve(page_url, &form.action)?;
    let resp = session.send(
        &Request::post(&action)
            .headers(headers::form())
            .body(form.encode())
            .redirects(Redirects::Manual),
    )?;
    tracing::debug!(status = resp.status, "assertion relayed to {}", action);
    Ok(())
}

pub(crate) fn credential_form(csrf_token: &str, credentials: &Credentials) -> FormSubmission {
    let mut form = FormSubmission::default();
    for (name, value) in [
        (CSRF_FIELD, csrf_token),
        (USERNAME_FIELD, credentials.username.as_str()),
        (PASSWORD_FIELD, credentials.password.as_str()),
        (DO_NOT_CACHE_FIELD, "1"),
        (PROCEED_FIELD, ""),
    ] {
        form.fields.insert(name.to_string(), value.to_string());
    }
    form
}

/// Resolves `reference` against `base`, as an [`AuthError`].
pub(crate) fn resolve(base: &str, reference: &str) -> Result<String, AuthError> {
    resolve_url(base, reference).map_err(|source| AuthError::InvalidUrl {
        url: reference.to_string(),
        source,
    })
}
