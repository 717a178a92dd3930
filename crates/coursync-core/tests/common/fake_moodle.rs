//! Canned Shibboleth identity provider plus course server.
//!
//! Serves the five handshake steps and three course downloads:
//! course 1 answers with the ZIP directly, course 2 with a confirmation form,
//! course 3 always fails. Course 4 answers like course 1 once its [`Gate`] is
//! opened; course 5 serves a page without any form.

use std::io::{Cursor, Write};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use super::http_server::{self, Recorded, Reply, TestServer};

pub const USERNAME: &str = "ab12cde";
pub const PASSWORD: &str = "p&ss wörd=1";
pub const CSRF: &str = "_csrf-4f1c";
pub const SESSION_COOKIE: &str = "MoodleSession";
pub const SESSION_VALUE: &str = "sess42";

pub const ENTRY_PATH: &str = "/Shibboleth.sso/Login";
const SAML_PATH: &str = "/idp/profile/SAML2/Redirect/SSO";
const LOGIN_TARGET: &str = "/idp/profile/SAML2/Redirect/SSO?execution=e1s1";
const ACS_PATH: &str = "/Shibboleth.sso/SAML2/POST";

/// Blocks a response until the test opens it.
#[derive(Debug, Clone, Default)]
pub struct Gate(Arc<(Mutex<bool>, Condvar)>);

impl Gate {
    pub fn open(&self) {
        let (open, cv) = &*self.0;
        *open.lock().unwrap() = true;
        cv.notify_all();
    }

    /// Waits until opened; gives up after 30 s so a broken test cannot hang.
    fn wait(&self) {
        let (open, cv) = &*self.0;
        let guard = open.lock().unwrap();
        let _ = cv
            .wait_timeout_while(guard, Duration::from_secs(30), |open| !*open)
            .unwrap();
    }
}

/// Knobs to break one handshake step or hold a course back.
#[derive(Debug, Clone, Default)]
pub struct FakeMoodleOptions {
    /// Entry point answers 200 instead of 302.
    pub entry_not_redirecting: bool,
    /// The SAML endpoint answers 302 without a `Location` header.
    pub idp_without_location: bool,
    /// Login page is served without a csrf_token input.
    pub omit_csrf: bool,
    /// Relay page has no container div inside its form.
    pub omit_relay_container: bool,
    /// Course 4 is only served once this gate is opened.
    pub held_course: Option<Gate>,
}

pub fn start() -> TestServer {
    start_with_options(FakeMoodleOptions::default())
}

pub fn start_with_options(opts: FakeMoodleOptions) -> TestServer {
    http_server::start(move |req, base| route(req, base, &opts))
}

pub fn course_url(server: &TestServer, id: u32) -> String {
    server.url(&format!("/course/{id}/download"))
}

/// ZIP served for course `id`.
pub fn course_zip(id: u32) -> Vec<u8> {
    let mut w = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let opts = zip::write::SimpleFileOptions::default();
    let files: &[(&str, &[u8])] = match id {
        1 => &[
            ("Lectures/lecture01.pdf", b"%PDF lecture 1"),
            ("Lectures/lecture02.pdf", b"%PDF lecture 2"),
            ("readme.txt", b"course one"),
        ],
        _ => &[
            ("Exercises/sheet01.pdf", b"%PDF sheet 1"),
            ("Exercises/sheet01_solution.pdf", b"%PDF solution 1"),
        ],
    };
    for (name, data) in files {
        w.start_file(*name, opts).unwrap();
        w.write_all(data).unwrap();
    }
    w.finish().unwrap().into_inner()
}

fn route(req: &Recorded, base: &str, opts: &FakeMoodleOptions) -> Reply {
    match (req.method.as_str(), req.path()) {
        ("GET", ENTRY_PATH) => {
            if opts.entry_not_redirecting {
                Reply::html("<html>maintenance</html>")
            } else {
                Reply::redirect(302, format!("{base}{SAML_PATH}?SAMLRequest=fZJN"))
            }
        }
        ("GET", SAML_PATH) if opts.idp_without_location => Reply::status(302),
        ("GET", SAML_PATH) => Reply::redirect(302, LOGIN_TARGET)
            .with_header("Set-Cookie", "JSESSIONID=idp-1; Path=/idp; HttpOnly"),
        ("POST", SAML_PATH) => login(req, base, opts),
        ("POST", ACS_PATH) => assertion_consumer(req, base),
        ("GET", "/course/1/download") => authed(req, || Reply::zip(course_zip(1))),
        ("GET", "/course/2/download") => authed(req, || Reply::html(CONFIRM_PAGE)),
        ("POST", "/course/2/confirm") => authed(req, || confirm(req, base)),
        ("GET", "/course/3/download") => Reply::status(500),
        ("GET", "/course/4/download") => authed(req, || {
            if let Some(gate) = &opts.held_course {
                gate.wait();
            }
            Reply::zip(course_zip(1))
        }),
        ("GET", "/course/5/download") => Reply::html("<html><body><p>This folder is empty.</p></body></html>"),
        _ => Reply::status(404),
    }
}

fn login(req: &Recorded, base: &str, opts: &FakeMoodleOptions) -> Reply {
    if !req.has_cookie("JSESSIONID", "idp-1") {
        return Reply::status(400);
    }
    if req.body.is_empty() {
        let token = if opts.omit_csrf {
            String::new()
        } else {
            format!(r#"<input type="hidden" name="csrf_token" value="{CSRF}" />"#)
        };
        return Reply::html(format!(
            r#"<html><body><form action="{LOGIN_TARGET}" method="post">
                <div class="form-element-wrapper">{token}
                  <input id="username" name="j_username" type="text" value="">
                  <input id="password" name="j_password" type="password">
                </div>
                <button type="submit" name="_eventId_proceed">Login</button>
            </form></body></html>"#
        ));
    }

    let form = req.form();
    let ok = form.get("csrf_token").map(String::as_str) == Some(CSRF)
        && form.get("j_username").map(String::as_str) == Some(USERNAME)
        && form.get("j_password").map(String::as_str) == Some(PASSWORD)
        && form.get("donotcache").map(String::as_str) == Some("1")
        && form.get("_eventId_proceed").map(String::as_str) == Some("");
    if !ok {
        return Reply::status(401);
    }

    let inputs = r#"<input type="hidden" name="RelayState" value="cookie&#x3a;1700000000_9f2c"/>
                    <input type="hidden" name="SAMLResponse" value="PD94bWwgdmVyc2lvbj0iMS4wIj8+"/>"#;
    let container = if opts.omit_relay_container {
        inputs.to_string()
    } else {
        format!("<div>{inputs}</div>")
    };
    Reply::html(format!(
        r#"<!DOCTYPE html><html><body onload="document.forms[0].submit()">
            <form action="{base}{ACS_PATH}" method="post">
              {container}
              <noscript><input type="submit" name="manual" value="Continue"/></noscript>
            </form></body></html>"#
    ))
}

fn assertion_consumer(req: &Recorded, base: &str) -> Reply {
    let form = req.form();
    let valid = form.get("SAMLResponse").map(String::as_str) == Some("PD94bWwgdmVyc2lvbj0iMS4wIj8+")
        && form.get("RelayState").map(String::as_str) == Some("cookie:1700000000_9f2c")
        && !form.contains_key("manual");
    if !valid {
        return Reply::status(400);
    }
    Reply::redirect(302, format!("{base}/my/"))
        .with_header("Set-Cookie", format!("{SESSION_COOKIE}={SESSION_VALUE}; Path=/"))
}

const CONFIRM_PAGE: &str = r#"<html><body>
  <h2>Download folder</h2>
  <form method="post" action="/course/2/confirm">
    <input type="hidden" name="id" value="2">
    <input type="hidden" name="sesskey" value="k3y">
    <input type="submit" value="Continue">
    <input type="submit" name="cancel" value="Cancel">
  </form>
</body></html>"#;

fn confirm(req: &Recorded, base: &str) -> Reply {
    let form = req.form();
    let expected_referer = format!("{base}/course/2/download");
    if form.get("sesskey").map(String::as_str) != Some("k3y")
        || form.contains_key("cancel")
        || req.header("referer") != Some(expected_referer.as_str())
    {
        return Reply::status(400);
    }
    Reply::zip(course_zip(2))
}

/// Session cookie required; otherwise bounce to the login page like the real
/// server does.
fn authed(req: &Recorded, ok: impl FnOnce() -> Reply) -> Reply {
    if req.has_cookie(SESSION_COOKIE, SESSION_VALUE) {
        ok()
    } else {
        Reply::redirect(303, "/login/index.php")
    }
}
