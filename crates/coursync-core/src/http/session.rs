//! Cookie-carrying HTTP session over libcurl.

use std::str;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use super::cookies::CookieJar;
use super::request::{parse_header_lines, Method, Redirects, Request, Response};

/// Transport knobs applied to every request of a session.
#[derive(Debug, Clone, Copy)]
pub struct TransportOptions {
    pub connect_timeout: Duration,
    /// Hop limit when a request follows redirects.
    pub max_redirects: u32,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            max_redirects: 10,
        }
    }
}

/// Authenticated context: a cookie store plus a transport.
///
/// Each request runs on its own curl handle seeded from the shared cookie
/// store, so a session can be used from several threads at once. Cookies set
/// or deleted by any response are folded back into the store.
#[derive(Debug, Default)]
pub struct Session {
    jar: Mutex<CookieJar>,
    options: TransportOptions,
}

impl Session {
    pub fn new(options: TransportOptions) -> Self {
        Self {
            jar: Mutex::new(CookieJar::new()),
            options,
        }
    }

    /// Snapshot of the current cookies.
    pub fn cookies(&self) -> CookieJar {
        self.lock_jar().clone()
    }

    /// Performs one request and returns the final response. Blocks the
    /// current thread; call from `spawn_blocking` when used from async code.
    pub fn send(&self, req: &Request) -> Result<Response, curl::Error> {
        let mut easy = curl::easy::Easy::new();
        easy.url(&req.url)?;
        easy.connect_timeout(self.options.connect_timeout)?;
        easy.follow_location(req.redirects == Redirects::Follow)?;
        easy.max_redirections(self.options.max_redirects)?;

        // An empty file name turns the cookie engine on without reading disk.
        easy.cookie_file("")?;
        let seeded = self.cookies();
        for line in seeded.netscape_lines() {
            easy.cookie_list(&line)?;
        }

        match req.method {
            Method::Get => easy.get(true)?,
            Method::Post => {
                easy.post(true)?;
                easy.post_fields_copy(req.body.as_deref().unwrap_or_default())?;
            }
        }

        let mut list = curl::easy::List::new();
        for (k, v) in &req.headers {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        easy.http_headers(list)?;

        let mut raw_headers: Vec<String> = Vec::new();
        let mut body: Vec<u8> = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    let line = s.trim_end();
                    // A new status line starts the headers of the next hop.
                    if line.starts_with("HTTP/") {
                        raw_headers.clear();
                    }
                    raw_headers.push(line.to_string());
                }
                true
            })?;
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        let effective_url = easy
            .effective_url()?
            .map(str::to_string)
            .unwrap_or_else(|| req.url.clone());

        let exported = easy.cookies()?;
        {
            let mut jar = self.lock_jar();
            jar.apply_transfer(&seeded, exported.iter().filter_map(|line| str::from_utf8(line).ok()));
        }

        tracing::debug!(
            method = ?req.method,
            url = %req.url,
            status,
            bytes = body.len(),
            "http exchange"
        );

        Ok(Response {
            status,
            headers: parse_header_lines(&raw_headers),
            body,
            effective_url,
        })
    }

    fn lock_jar(&self) -> MutexGuard<'_, CookieJar> {
        self.jar.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
