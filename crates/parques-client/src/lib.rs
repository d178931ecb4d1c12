pub mod config;
pub mod controller;
pub mod net_client;
pub mod session;
pub mod transport;

#[cfg(feature = "native")]
pub mod ws_transport;
