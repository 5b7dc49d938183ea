//! Imelink Common Types and Transport
//!
//! This crate provides the wire protocol and transport layer for the imelink
//! IPC binding, which carries input-method-editor (IME) display control calls
//! between a client process and the IME manager service.
//!
//! # Overview
//!
//! Imelink is a hand-written equivalent of generated binder-style stub/proxy
//! code. Every remote call is a transaction: a small integer identifying the
//! method plus an ordered byte buffer (a [`Parcel`]) holding the arguments.
//! This crate contains the pieces shared by both call ends:
//!
//! - **Protocol Layer**: the parcel encoding, the exception reply protocol,
//!   reserved transaction codes, and the error taxonomy
//! - **Transport Layer**: the [`Transport`]/[`Transactable`] seam with a
//!   loopback implementation for in-process use and a TCP channel for
//!   crossing process boundaries
//!
//! # Architecture
//!
//! The wire format is deliberately not self-describing: argument order and
//! types are implied by the transaction code, exactly as in the generated
//! code this crate replaces. See [`parcel`] for the encoding rules and
//! [`transport`] for the TCP framing.
//!
//! # Components
//!
//! - [`protocol`] - Parcel, exception protocol, errors, reserved codes
//! - [`transport`] - Transport trait, loopback and TCP implementations
//!
//! [`Parcel`]: protocol::Parcel
//! [`Transport`]: transport::Transport
//! [`Transactable`]: transport::Transactable

pub mod protocol;
pub mod transport;

pub use protocol::*;
