//! # Dateiwald
//!
//! A network file browser. Clients list directories, download files, upload new
//! files and create directories, all confined to one server-side root directory.
//! A small IP ban list and a per-client theme sit on top.
//!
//! ## Architecture
//!
//! - **Axum** for routing and extraction, **tower-http** for file serving, tracing
//!   and compression
//! - **Tokio** for the runtime, the shared stores and async file I/O
//! - **Serde** for listings, error bodies and configuration
//!
//! ## Core Components
//!
//! - [`fs`]: path confinement, directory listing, uploads and directory creation
//! - [`store`]: the ban list and session store shared by all requests
//! - [`middleware`]: composable request interceptors (logging, bans, method guard, headers)
//! - [`routes`]: HTTP handlers and the routing table
//! - [`render`]: turns listings into responses
//! - [`config`]: layered configuration loading and validation
//! - [`error`]: the HTTP error type and its JSON body
//! - [`metrics`]: request counters
//! - [`state`]: the shared application state
//! - [`types`]: listing model and request/response DTOs

pub mod config;
pub mod error;
pub mod fs;
pub mod metrics;
pub mod middleware;
pub mod render;
pub mod routes;
pub mod state;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;
