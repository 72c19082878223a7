//! HTTP middleware stack: CORS, per-request trace span, caller identity.

pub mod auth;
pub mod cors;
pub mod trace;
