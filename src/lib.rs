//! The `taskhive` library crate.
//!
//! Contains the domain models, authentication mechanisms, routing
//! configuration and error handling for the TaskHive API. The binary in
//! `main.rs` wires these together into the running server.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
