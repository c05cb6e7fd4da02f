//! Shared UI crate for Wordsprout. Cross-platform logic and views live here.

pub mod core;
pub mod explain;
pub mod i18n;
pub mod views;
