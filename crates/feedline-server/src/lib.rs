//! HTTP and `WebSocket` front end for the Feedline bridge.
//!
//! This crate provides an Axum server that exposes:
//!
//! - **`WebSocket` feed** (`GET /ws?lastMod=<cursor>&Stream=<name>`): one
//!   session per connection, pushing each new batch of stream entries as
//!   a JSON text frame
//! - **Demo page** (`GET /test`): renders the current contents of the
//!   test stream and opens a feed from where that snapshot ends
//!
//! # Architecture
//!
//! The server holds a single store handle in [`AppState`] and hands it to
//! every session. Sessions are independent: each owns its cursor and its
//! connection and runs on the task Axum gives the upgraded socket.

pub mod error;
pub mod handlers;
pub mod pages;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use error::HandlerError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, bind, serve, start_server};
pub use state::AppState;
