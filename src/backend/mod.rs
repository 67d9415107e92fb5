//! Saved-address backend: payload validation and the HTTP client.

mod client;
mod payload;

pub use client::AddressBookClient;
pub use payload::{AddressPayload, AddressRecord};
