//! Client endpoint
//!
//! Accepts local applications and forwards their bytes, encrypted, to the
//! server. The SOCKS5 conversation itself is carried through opaquely.

#[allow(clippy::module_inception)]
mod client;
mod session;

pub use client::{run_client, Client};
pub use session::{handle_local, ClientContext};
