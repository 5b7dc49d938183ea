//! Dial-back seam for reaching client callbacks.
//!
//! A client registers by sending the string address of an endpoint it hosts;
//! the service turns that address into an `ImeClientCallback` through this
//! trait. Production uses TCP; tests plug in a loopback connector.

use std::sync::Arc;

use imelink_binding::client_callback::{ImeClientCallback, ImeClientCallbackProxy};
use imelink_common::protocol::Result;
use imelink_common::transport::TcpTransport;

/// Turns a registered endpoint address into a live callback.
pub trait CallbackConnector: Send + Sync {
    fn connect(&self, endpoint: &str) -> Result<Arc<dyn ImeClientCallback>>;
}

/// Production connector: dials the endpoint over TCP and wraps the
/// connection in a callback proxy.
pub struct TcpCallbackConnector;

impl CallbackConnector for TcpCallbackConnector {
    fn connect(&self, endpoint: &str) -> Result<Arc<dyn ImeClientCallback>> {
        let transport = TcpTransport::connect(endpoint)?;
        Ok(Arc::new(ImeClientCallbackProxy::new(Arc::new(transport))))
    }
}
