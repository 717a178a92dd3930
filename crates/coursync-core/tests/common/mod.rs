#![allow(dead_code)]

pub mod fake_moodle;
pub mod http_server;
