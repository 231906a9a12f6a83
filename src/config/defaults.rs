//! Default value functions for configuration.

use std::net::{Ipv4Addr, SocketAddr};

pub fn default_room() -> String {
    "#lobby".to_string()
}

pub fn default_address() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 6667))
}
