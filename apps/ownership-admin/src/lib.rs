//! Admin interface with ownership-guarded record editing.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod logging;
pub mod server;
