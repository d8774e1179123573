//! HTTP client and local state for the Jyotish backend.
//!
//! Provides the REST wrapper ([`api`]), the bearer-token session
//! ([`session`]), key/value storage standing in for browser local
//! storage ([`storage`]), the last-chart cache ([`cache`]), and the
//! person-scoped active chart flow that ties them together ([`flow`]).

pub mod api;
pub mod cache;
pub mod config;
pub mod flow;
pub mod messages;
pub mod session;
pub mod storage;
