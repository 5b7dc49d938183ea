use std::sync::Arc;

use imelink_binding::client_callback::{ImeClientCallback, ImeClientCallbackStub};
use imelink_binding::manager::{ImeManager, ImeManagerProxy};
use imelink_common::protocol::Result;
use imelink_common::transport::{TcpTransport, Transactable, Transport};

use crate::state::ClientDisplayState;

/// The callback implementation the service pushes into.
///
/// Applies every announcement to the shared [`ClientDisplayState`]; carries
/// no other state, so the client can hand one to a stub and keep reading the
/// mirror from its own handle.
pub struct ClientCallbackHandler {
    state: Arc<ClientDisplayState>,
}

impl ClientCallbackHandler {
    pub fn new(state: Arc<ClientDisplayState>) -> Self {
        ClientCallbackHandler { state }
    }
}

impl ImeClientCallback for ClientCallbackHandler {
    fn set_ime_display(&self, display_id: i32) -> Result<()> {
        tracing::info!(display_id, "IME display changed");
        if self.state.apply_display(display_id) {
            tracing::info!("IME display removed");
        }
        Ok(())
    }

    fn set_ime_display_status(&self, show: bool) -> Result<()> {
        tracing::info!(show, "IME visibility changed");
        self.state.apply_visibility(show);
        Ok(())
    }
}

/// Client-side handle to the IME manager service.
///
/// Wraps an [`ImeManagerProxy`] over a caller-supplied transport and owns
/// the local display-state mirror. The embedding process hosts
/// [`callback_stub`](Self::callback_stub) on some endpoint and passes that
/// endpoint to [`register`](Self::register) so the service can dial back.
pub struct ImeClientManager {
    proxy: ImeManagerProxy,
    state: Arc<ClientDisplayState>,
}

impl ImeClientManager {
    /// Creates a manager over an already-established transport.
    pub fn new(remote: Arc<dyn Transport>) -> Self {
        ImeClientManager {
            proxy: ImeManagerProxy::new(remote),
            state: Arc::new(ClientDisplayState::new()),
        }
    }

    /// Connects to the manager service over TCP.
    pub fn connect(addr: &str) -> Result<Self> {
        let transport = TcpTransport::connect(addr)?;
        Ok(Self::new(Arc::new(transport)))
    }

    /// The shared display-state mirror.
    pub fn state(&self) -> Arc<ClientDisplayState> {
        self.state.clone()
    }

    /// A dispatcher for the callback contract, wired to this manager's
    /// state mirror. Host it on the endpoint passed to
    /// [`register`](Self::register).
    pub fn callback_stub(&self) -> Arc<dyn Transactable> {
        Arc::new(ImeClientCallbackStub::new(ClientCallbackHandler::new(
            self.state.clone(),
        )))
    }

    /// Registers the callback endpoint with the service.
    ///
    /// The service dials back immediately with the current display, so the
    /// mirror is up to date once this returns.
    pub fn register(&self, callback_endpoint: &str) -> Result<()> {
        tracing::info!(callback_endpoint, "registering with IME manager");
        self.proxy.register_client_callback(callback_endpoint)
    }

    /// Reports whether the client's input window is showing.
    pub fn send_window_status(&self, show: bool) -> Result<()> {
        tracing::debug!(show, "sending window status");
        self.proxy.send_client_window_status(show)
    }

    /// Asks the service which display hosts the IME.
    pub fn ime_display(&self) -> Result<i32> {
        self.proxy.get_ime_display()
    }
}
