pub mod config;
pub mod error;
pub mod logging;

pub mod auth;
pub mod fetch;
pub mod html;
pub mod http;
pub mod rules;
pub mod sync;
