//! Platform-agnostic building blocks for the explanation pipeline.

pub mod catalog;
pub mod config;
pub mod detect;
pub mod platform;
pub mod remote;
pub mod timing;
