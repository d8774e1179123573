//! Domain types and pure helpers for the Jyotish client.
//!
//! Nothing in this crate performs I/O. Chart computation happens on the
//! backend; this crate shapes requests for it ([`params`]), decides whose
//! chart is active ([`identity`]), and derives views from the opaque
//! response ([`chart`], [`projection`], [`readings`], [`matching`]).

pub mod chart;
pub mod error;
pub mod identity;
pub mod matching;
pub mod params;
pub mod person;
pub mod projection;
pub mod readings;
pub mod types;
