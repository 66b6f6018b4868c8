//! plotwise - chat client for locality-level real estate analysis.
//!
//! Talks to an analysis backend over HTTP, keeps the conversation in an
//! in-memory transcript, and turns replies into chart and table render
//! models that both the embedded web page and the terminal commands
//! paint.
//!
//! Crate layout:
//! - [`api`] - wire types and the blocking backend client
//! - [`store`] - transcript of user and bot messages
//! - [`transform`] - chart and table models built from replies
//! - [`view`] - full-page render model for the web chat
//! - [`session`] - one conversation wired to one backend
//! - [`config`] - layered TOML configuration with env overrides
//! - [`web`] - embedded single-page chat server
//! - [`cli`] - terminal subcommands

pub mod api;
pub mod cli;
pub mod config;
pub mod session;
pub mod store;
pub mod transform;
pub mod view;
pub mod web;
