//! Process configuration.
//!
//! There are no flags or config files: the listen port is fixed. `main`
//! builds a [`Config`] once and passes the pieces where they are needed.
//! Log verbosity is the one runtime knob, read from `RUST_LOG`.

use std::net::{Ipv4Addr, SocketAddr};

use crate::body::Limits;

/// The port the service listens on.
pub const PORT: u16 = 3000;

/// `RUST_LOG` fallback when the variable is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "ackd=info";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    pub addr: SocketAddr,
    pub limits: Limits,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, PORT)),
            limits: Limits::default(),
        }
    }
}
