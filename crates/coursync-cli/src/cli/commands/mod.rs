//! CLI command handlers. Each command is in its own file.

mod check;
mod sync;

pub use check::run_check;
pub use sync::run_sync;

#[cfg(test)]
pub(crate) use sync::describe;
