//! API paths the auth layer knows about, relative to the base URL.

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const LOGOUT_PATH: &str = "/auth/logout";

/// Requests whose URL contains one of these always pass the gate.
pub const AUTH_ALLOW_LIST: [&str; 2] = [LOGIN_PATH, REGISTER_PATH];
