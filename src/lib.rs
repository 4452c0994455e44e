//! Broodje - sandwich recipes from an LLM over HTTP
//!
//! Broodje turns a free-text sandwich idea into a recipe:
//! - synchronously, by calling the LLM inside the request
//! - asynchronously, by recording a task in a datastore (Supabase), triggering a
//!   background worker and letting the caller poll for the result
//!
//! The background worker can run in the same process (`worker`) or on an
//! external serverless platform reached through the trigger URL.

pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod prompt;
pub mod store;
pub mod trigger;
pub mod types;
pub mod worker;

pub use error::{Error, Result};
