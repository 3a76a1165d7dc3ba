//! subiq CLI library.
//!
//! This crate provides the functionality behind the `subiq` binary: input
//! loading, staged output writing, logging setup and the `convert` and
//! `inspect` commands.

pub mod commands;
pub mod input;
pub mod logging;
pub mod output;
