// Frameworks: process bootstrap and configuration.

pub mod client;
pub mod config;
pub mod server;
