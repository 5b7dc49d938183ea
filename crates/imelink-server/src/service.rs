use std::sync::{Arc, Mutex, PoisonError};

use imelink_binding::client_callback::ImeClientCallback;
use imelink_binding::manager::{ImeManager, INVALID_DISPLAY_ID};
use imelink_common::protocol::{IpcError, RemoteException, Result};

use crate::connector::CallbackConnector;

/// The IME manager service.
///
/// Holds the single piece of state both contracts revolve around (which
/// display hosts the IME and whether the client window is visible) and the
/// set of registered client callbacks. Inbound `ImeManager` calls mutate the
/// state; changes are pushed back out through each registered
/// `ImeClientCallback`.
///
/// # Concurrency
///
/// The host dispatches transactions from multiple connections concurrently.
/// State lives behind one mutex; callback pushes happen on a snapshot taken
/// after the state change, so a slow or dead client never blocks the lock.
pub struct ImeDisplayService {
    connector: Arc<dyn CallbackConnector>,
    state: Mutex<ServiceState>,
}

struct ServiceState {
    display_id: i32,
    window_visible: bool,
    clients: Vec<ClientEntry>,
}

struct ClientEntry {
    endpoint: String,
    callback: Arc<dyn ImeClientCallback>,
}

impl ImeDisplayService {
    /// Creates a service with no display assigned.
    pub fn new(connector: Arc<dyn CallbackConnector>) -> Self {
        Self::with_display_unchecked(connector, INVALID_DISPLAY_ID)
    }

    /// Creates a service already targeting `display_id`.
    ///
    /// # Errors
    ///
    /// Rejects ids below [`INVALID_DISPLAY_ID`] with an illegal-argument
    /// exception, same as [`set_target_display`](Self::set_target_display).
    pub fn with_display(connector: Arc<dyn CallbackConnector>, display_id: i32) -> Result<Self> {
        validate_display_id(display_id)?;
        Ok(Self::with_display_unchecked(connector, display_id))
    }

    fn with_display_unchecked(connector: Arc<dyn CallbackConnector>, display_id: i32) -> Self {
        ImeDisplayService {
            connector,
            state: Mutex::new(ServiceState {
                display_id,
                window_visible: false,
                clients: Vec::new(),
            }),
        }
    }

    /// Retargets the IME to `display_id` and pushes the change to every
    /// registered client. Passing [`INVALID_DISPLAY_ID`] announces that the
    /// current display went away.
    ///
    /// # Errors
    ///
    /// Returns an illegal-argument exception for ids below
    /// [`INVALID_DISPLAY_ID`]; the state is untouched and nothing is pushed.
    pub fn set_target_display(&self, display_id: i32) -> Result<()> {
        validate_display_id(display_id)?;

        let recipients = {
            let mut state = self.lock();
            if state.display_id == display_id {
                return Ok(());
            }
            tracing::info!(
                from = state.display_id,
                to = display_id,
                "retargeting IME display"
            );
            state.display_id = display_id;
            snapshot(&state)
        };

        self.push(&recipients, |callback| callback.set_ime_display(display_id));
        Ok(())
    }

    /// The display currently hosting the IME.
    pub fn target_display(&self) -> i32 {
        self.lock().display_id
    }

    /// Whether the client window was last reported visible.
    pub fn window_visible(&self) -> bool {
        self.lock().window_visible
    }

    /// Number of live callback registrations.
    pub fn client_count(&self) -> usize {
        self.lock().clients.len()
    }

    /// Delivers `push` to each recipient, dropping callbacks whose channel
    /// has died. Push failures never fail the inbound call that caused them.
    fn push<F>(&self, recipients: &[(String, Arc<dyn ImeClientCallback>)], push: F)
    where
        F: Fn(&dyn ImeClientCallback) -> Result<()>,
    {
        let mut dead = Vec::new();
        for (endpoint, callback) in recipients {
            if let Err(e) = push(callback.as_ref()) {
                tracing::warn!(endpoint, error = %e, "dropping unreachable client callback");
                dead.push(endpoint.clone());
            }
        }
        if !dead.is_empty() {
            let mut state = self.lock();
            state.clients.retain(|entry| !dead.contains(&entry.endpoint));
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ServiceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ImeManager for ImeDisplayService {
    fn register_client_callback(&self, endpoint: &str) -> Result<()> {
        tracing::info!(endpoint, "registering client callback");
        let callback = self.connector.connect(endpoint)?;

        // A client reconnecting with the same endpoint replaces its old
        // registration rather than accumulating a dead one.
        let display_id = {
            let mut state = self.lock();
            state.clients.retain(|entry| entry.endpoint != endpoint);
            state.clients.push(ClientEntry {
                endpoint: endpoint.to_string(),
                callback: callback.clone(),
            });
            state.display_id
        };

        // Bring the new client up to date immediately. A client that cannot
        // take the initial push is not registered.
        if let Err(e) = callback.set_ime_display(display_id) {
            self.lock().clients.retain(|entry| entry.endpoint != endpoint);
            return Err(e);
        }
        Ok(())
    }

    fn send_client_window_status(&self, show: bool) -> Result<()> {
        tracing::debug!(show, "client window status");
        let recipients = {
            let mut state = self.lock();
            state.window_visible = show;
            snapshot(&state)
        };
        self.push(&recipients, |callback| callback.set_ime_display_status(show));
        Ok(())
    }

    fn get_ime_display(&self) -> Result<i32> {
        Ok(self.lock().display_id)
    }
}

fn snapshot(state: &ServiceState) -> Vec<(String, Arc<dyn ImeClientCallback>)> {
    state
        .clients
        .iter()
        .map(|entry| (entry.endpoint.clone(), entry.callback.clone()))
        .collect()
}

fn validate_display_id(display_id: i32) -> Result<()> {
    if display_id < INVALID_DISPLAY_ID {
        return Err(IpcError::Exception(RemoteException::illegal_argument(
            format!("invalid display id: {}", display_id),
        )));
    }
    Ok(())
}
