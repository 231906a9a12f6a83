//! Network module.
//!
//! Contains the Gateway (TCP/TLS listener) and the Connection worker that
//! runs for each client.

mod connection;
mod gateway;

pub use connection::{Connection, MAX_LINE_LEN};
pub use gateway::Gateway;
