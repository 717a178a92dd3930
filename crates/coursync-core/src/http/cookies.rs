//! Cookie store kept between libcurl handles.
//!
//! libcurl's cookie engine lives inside one easy handle. To let independent
//! handles (one per request, possibly on different threads) share a session,
//! cookies are exported after every transfer in Netscape format and imported
//! into the next handle.

use std::collections::BTreeMap;

const HTTP_ONLY_PREFIX: &str = "#HttpOnly_";

/// One cookie as exported by libcurl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub domain: String,
    pub include_subdomains: bool,
    pub path: String,
    pub secure: bool,
    /// Unix seconds; 0 for a session cookie.
    pub expires: i64,
    pub name: String,
    pub value: String,
    pub http_only: bool,
}

impl Cookie {
    /// Parses one Netscape cookie-file line (7 tab-separated fields).
    pub fn parse_netscape(line: &str) -> Option<Cookie> {
        let (http_only, line) = match line.strip_prefix(HTTP_ONLY_PREFIX) {
            Some(rest) => (true, rest),
            None => (false, line),
        };
        if line.starts_with('#') || line.trim().is_empty() {
            return None;
        }
        let mut parts = line.splitn(7, '\t');
        let domain = parts.next()?.to_string();
        let include_subdomains = parts.next()?.eq_ignore_ascii_case("TRUE");
        let path = parts.next()?.to_string();
        let secure = parts.next()?.eq_ignore_ascii_case("TRUE");
        let expires = parts.next()?.parse::<i64>().ok()?;
        let name = parts.next()?.to_string();
        let value = parts.next().unwrap_or_default().to_string();
        Some(Cookie {
            domain,
            include_subdomains,
            path,
            secure,
            expires,
            name,
            value,
            http_only,
        })
    }

    /// Netscape line accepted by `CURLOPT_COOKIELIST`.
    pub fn to_netscape(&self) -> String {
        let flag = |b: bool| if b { "TRUE" } else { "FALSE" };
        format!(
            "{}{}\t{}\t{}\t{}\t{}\t{}\t{}",
            if self.http_only { HTTP_ONLY_PREFIX } else { "" },
            self.domain,
            flag(self.include_subdomains),
            self.path,
            flag(self.secure),
            self.expires,
            self.name,
            self.value
        )
    }

    fn key(&self) -> (String, String, String) {
        (self.domain.clone(), self.path.clone(), self.name.clone())
    }
}

/// Cookies keyed by (domain, path, name); newer values replace older ones.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: BTreeMap<(String, String, String), Cookie>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a cookie.
    pub fn store(&mut self, cookie: Cookie) {
        self.cookies.insert(cookie.key(), cookie);
    }

    /// Merges cookies exported from a finished transfer.
    pub fn merge_netscape<'a>(&mut self, lines: impl IntoIterator<Item = &'a str>) {
        for line in lines {
            match Cookie::parse_netscape(line) {
                Some(cookie) => self.store(cookie),
                None => tracing::trace!("ignoring cookie line {:?}", line),
            }
        }
    }

    /// Folds the cookies a transfer ended with back into the store.
    ///
    /// `seeded` is the snapshot the transfer started from. A seeded cookie
    /// missing from `exported` was deleted by a response and is removed here,
    /// unless the store has since been given a different value. Exported
    /// cookies whose value is unchanged from the seed do not overwrite the
    /// store, so a slower request cannot roll back a newer value.
    pub fn apply_transfer<'a>(&mut self, seeded: &CookieJar, exported: impl IntoIterator<Item = &'a str>) {
        let mut after = CookieJar::new();
        after.merge_netscape(exported);

        for (key, before) in &seeded.cookies {
            if after.cookies.contains_key(key) {
                continue;
            }
            if self.cookies.get(key).is_some_and(|c| c.value == before.value) {
                tracing::trace!(name = %before.name, domain = %before.domain, "cookie deleted");
                self.cookies.remove(key);
            }
        }
        for (key, cookie) in after.cookies {
            let unchanged = seeded.cookies.get(&key).is_some_and(|c| c.value == cookie.value);
            if !unchanged {
                self.cookies.insert(key, cookie);
            }
        }
    }

    /// Lines to import into a fresh handle.
    pub fn netscape_lines(&self) -> Vec<String> {
        self.cookies.values().map(Cookie::to_netscape).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Cookie> {
        self.cookies.values().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.cookies.values()
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}
