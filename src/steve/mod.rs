mod client;
pub mod domain;
mod server;

pub use client::new_client;
pub use server::{ManagementServer, SteveError, SteveServer};
