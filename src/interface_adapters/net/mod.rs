// Network adapter for browser-facing presence sockets.

pub mod client;

pub use client::ws_handler;
