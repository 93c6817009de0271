//! Thin wrappers over the REST API, all routed through `ApiClient`.

pub mod auth;
pub mod ledger;
