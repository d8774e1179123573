//! `jyotish` command-line client.
//!
//! Argument parsing lives in [`args`], subcommand execution in
//! [`commands`] and text output in [`render`].

pub mod args;
pub mod commands;
pub mod render;
