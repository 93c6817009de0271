//! # fintrack
//!
//! Client for a personal-finance REST API (earnings, savings, spending,
//! lending, borrowing).
//!
//! The interesting part is client-side session handling. The server's auth
//! cookie is opaque to the client, so whether a user is logged in is
//! inferred (`session`), requests are gated locally on that inference
//! (`net::gate`), 401s are funnelled into a single logout path
//! (`net::watcher` → `auth::handler` → `auth::context`), and login state is
//! persisted so it survives restarts (`storage`, `cookies`).

pub mod app;
pub mod auth;
pub mod config;
pub mod cookies;
pub mod net;
pub mod services;
pub mod session;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_helpers;
