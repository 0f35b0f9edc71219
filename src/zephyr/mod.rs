//! Zephyr Scale REST access: request dispatch and payload mapping.

pub mod client;
pub mod payload;

pub use client::{ApiRequest, ApiResponse, HttpZephyrClient, Method, ZephyrApi};

#[cfg(test)]
pub use client::MockZephyrApi;
