/*
 * Responsibility
 * - public entry points of the middleware layers (each exposes `apply`)
 */
pub mod auth;
pub mod context;
pub mod http;
pub mod security_headers;
