//! Request identity for a multi-tenant business API.
//!
//! Resolves who is calling (login name, user id, client id) from the
//! security principal, the bearer token, or the detached default, keeps
//! per-request scratch state in a [`context::RequestContext`], and maps
//! domain failures to a fixed-shape error body.

pub mod api;
pub mod app;
pub mod config;
pub mod context;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
