//! Imelink Server
//!
//! This crate provides the IME manager service: the concrete implementation
//! behind the `ImeManager` contract. It tracks which display hosts the IME,
//! keeps the set of registered client callbacks, and pushes display and
//! visibility changes back to clients through the `ImeClientCallback`
//! contract.

pub mod connector;
pub mod host;
pub mod service;

pub use connector::{CallbackConnector, TcpCallbackConnector};
pub use host::serve_manager;
pub use service::ImeDisplayService;
