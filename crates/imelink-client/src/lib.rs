//! Imelink Client
//!
//! Client-side counterpart of the IME manager service. An IME process embeds
//! [`ImeClientManager`] to talk to the manager contract and hosts a callback
//! stub so the service can push display and visibility changes back; both
//! sides share a [`ClientDisplayState`] mirroring what the service last
//! announced.

pub mod manager;
pub mod state;

pub use manager::{ClientCallbackHandler, ImeClientManager};
pub use state::{ClientDisplayState, DisplaySnapshot};
