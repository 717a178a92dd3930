//! HTML form extraction shared by the SSO handshake and the archive fetcher.
//!
//! Identity providers and the course server hand back their next step as an
//! auto-submitting HTML form rather than a redirect, so both callers need the
//! form's `action` and its input fields.

mod form;

pub use form::{extract_form, find_input_value, FormScope, FormSubmission};
