//! Networking for the single read-only dataset fetch.

mod client;

pub use client::HttpClient;
