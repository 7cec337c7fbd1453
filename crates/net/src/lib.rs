//! Parley Network Library
//!
//! TCP chat client speaking a length-prefixed frame protocol.
//!
//! # Architecture
//!
//! - **Framer**: every message on the wire is `u32_be(length)` followed
//!   by that many bytes of UTF-8 payload
//! - **Connection loop**: one task owns the socket, alternating a
//!   bounded inbound wait with service of the outbound mailbox
//! - **Mailbox**: single-slot, last-write-wins bridge between callers
//!   and the loop
//!
//! The server is an opaque peer speaking the same framing; there is no
//! session or identity protocol on top.
//!
//! # Usage
//!
//! ```ignore
//! let client = ChatClient::new(ClientConfig::new("127.0.0.1", DEFAULT_PORT));
//! client.start().await?;
//!
//! client.submit_message("hello");
//!
//! // Received frames print as they arrive; the state tells you when
//! // the connection has died.
//! if client.state() == ConnectionState::Closed { /* done */ }
//! client.stop();
//! ```

pub mod client;
pub mod config;
pub mod error;
mod frame;

pub use client::{ChatClient, ConnectionState};
pub use config::ClientConfig;
pub use error::{Error, Result};

/// Default port for Parley chat servers
pub const DEFAULT_PORT: u16 = 10000;
