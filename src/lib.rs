//! Ferret is a line-mode terminal chat client for local model servers.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`project`] walks a source tree into a [`project::ProjectIndex`] and
//!   retrieves the blocks most relevant to a question under a size budget.
//! - [`core`] owns the per-conversation [`core::session::ChatSession`], the
//!   streaming code-fence segmenter, configuration, and the chat transport.
//! - [`commands`] implements slash-command parsing and execution.
//! - [`api`] defines the request/response payloads of the chat endpoint.
//! - [`cli`] parses arguments and runs the interactive loop.

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod project;
pub mod utils;
