//! Service behavior tests over the loopback transport.
//!
//! The client manager talks to the service through the real stub/proxy pair;
//! the dial-back seam is a loopback connector, so every push to a client
//! callback crosses the same marshalling path as production, minus sockets.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use imelink_binding::client_callback::ImeClientCallbackProxy;
use imelink_binding::manager::{ImeManagerStub, INVALID_DISPLAY_ID};
use imelink_client::ImeClientManager;
use imelink_common::protocol::{ExceptionCode, IpcError};
use imelink_common::transport::{LoopbackTransport, Transactable, Transport};
use imelink_server::{CallbackConnector, ImeDisplayService};

/// Dial-back connector backed by an in-process endpoint table.
#[derive(Default)]
struct LoopbackConnector {
    endpoints: Mutex<HashMap<String, Arc<dyn Transactable>>>,
}

impl LoopbackConnector {
    fn host(&self, endpoint: &str, stub: Arc<dyn Transactable>) {
        self.endpoints
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), stub);
    }
}

impl CallbackConnector for LoopbackConnector {
    fn connect(
        &self,
        endpoint: &str,
    ) -> imelink_common::protocol::Result<Arc<dyn imelink_binding::ImeClientCallback>> {
        let stub = self
            .endpoints
            .lock()
            .unwrap()
            .get(endpoint)
            .cloned()
            .ok_or_else(|| IpcError::Connection(format!("no such endpoint: {}", endpoint)))?;
        Ok(Arc::new(ImeClientCallbackProxy::new(Arc::new(
            LoopbackTransport::new(stub),
        ))))
    }
}

struct Session {
    connector: Arc<LoopbackConnector>,
    service: Arc<ImeDisplayService>,
    client: ImeClientManager,
}

fn session_with_display(display_id: i32) -> Session {
    let connector = Arc::new(LoopbackConnector::default());
    let service = Arc::new(
        ImeDisplayService::with_display(connector.clone(), display_id).unwrap(),
    );
    let stub = Arc::new(ImeManagerStub::new(service.clone()));
    let client = ImeClientManager::new(Arc::new(LoopbackTransport::new(stub)));
    Session {
        connector,
        service,
        client,
    }
}

fn register(session: &Session, endpoint: &str) {
    session.connector.host(endpoint, session.client.callback_stub());
    session.client.register(endpoint).unwrap();
}

#[test]
fn test_register_pushes_current_display() {
    let session = session_with_display(4);
    register(&session, "client-a");

    // The mirror is current as soon as registration returns.
    assert_eq!(session.client.state().display_id(), 4);
    assert_eq!(session.service.client_count(), 1);
}

#[test]
fn test_get_ime_display() {
    let session = session_with_display(4);
    assert_eq!(session.client.ime_display().unwrap(), 4);

    let fresh = session_with_display(INVALID_DISPLAY_ID);
    assert_eq!(fresh.client.ime_display().unwrap(), INVALID_DISPLAY_ID);
}

#[test]
fn test_window_status_reaches_registered_client() {
    let session = session_with_display(4);
    register(&session, "client-a");

    session.client.send_window_status(true).unwrap();
    assert!(session.client.state().ime_showing());
    assert!(session.service.window_visible());

    session.client.send_window_status(false).unwrap();
    assert!(!session.client.state().ime_showing());
}

#[test]
fn test_retarget_pushes_new_display() {
    let session = session_with_display(4);
    register(&session, "client-a");

    session.service.set_target_display(7).unwrap();
    assert_eq!(session.client.state().display_id(), 7);
}

#[test]
fn test_display_removal_reaches_client() {
    let session = session_with_display(4);
    register(&session, "client-a");

    session.service.set_target_display(INVALID_DISPLAY_ID).unwrap();

    let snapshot = session.client.state().snapshot();
    assert_eq!(snapshot.display_id, INVALID_DISPLAY_ID);
    assert_eq!(snapshot.removals, 1);
}

#[test]
fn test_invalid_display_id_raises_illegal_argument() {
    let session = session_with_display(4);
    register(&session, "client-a");

    let err = session.service.set_target_display(-3).unwrap_err();
    match err {
        IpcError::Exception(exception) => {
            assert_eq!(exception.code, ExceptionCode::IllegalArgument);
        }
        other => panic!("expected illegal-argument exception, got {:?}", other),
    }

    // Rejected ids leave the state and the client untouched.
    assert_eq!(session.service.target_display(), 4);
    assert_eq!(session.client.state().display_id(), 4);
}

#[test]
fn test_register_unknown_endpoint_fails() {
    let session = session_with_display(4);
    let err = session.client.register("nowhere").unwrap_err();
    assert!(matches!(err, IpcError::Connection(_)));
    assert_eq!(session.service.client_count(), 0);
}

#[test]
fn test_reregistration_replaces_previous_entry() {
    let session = session_with_display(4);
    register(&session, "client-a");
    register(&session, "client-a");
    assert_eq!(session.service.client_count(), 1);
}

/// Loopback transport with a kill switch, standing in for a client whose
/// connection drops after registration.
struct KillableTransport {
    alive: Arc<AtomicBool>,
    inner: LoopbackTransport,
}

impl Transport for KillableTransport {
    fn transact(
        &self,
        code: u32,
        data: &imelink_common::protocol::Parcel,
        flags: imelink_common::transport::CallFlags,
    ) -> imelink_common::protocol::Result<imelink_common::transport::TransactStatus> {
        if !self.alive.load(Ordering::SeqCst) {
            return Err(IpcError::Connection("peer gone".to_string()));
        }
        self.inner.transact(code, data, flags)
    }
}

struct KillableConnector {
    stub: Mutex<Option<Arc<dyn Transactable>>>,
    alive: Arc<AtomicBool>,
}

impl CallbackConnector for KillableConnector {
    fn connect(
        &self,
        endpoint: &str,
    ) -> imelink_common::protocol::Result<Arc<dyn imelink_binding::ImeClientCallback>> {
        let stub = self
            .stub
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| IpcError::Connection(format!("no such endpoint: {}", endpoint)))?;
        Ok(Arc::new(ImeClientCallbackProxy::new(Arc::new(
            KillableTransport {
                alive: self.alive.clone(),
                inner: LoopbackTransport::new(stub),
            },
        ))))
    }
}

#[test]
fn test_dead_callback_is_dropped_on_push() {
    let alive = Arc::new(AtomicBool::new(true));
    let connector = Arc::new(KillableConnector {
        stub: Mutex::new(None),
        alive: alive.clone(),
    });
    let service = Arc::new(ImeDisplayService::with_display(connector.clone(), 4).unwrap());
    let stub = Arc::new(ImeManagerStub::new(service.clone()));
    let client = ImeClientManager::new(Arc::new(LoopbackTransport::new(stub)));

    *connector.stub.lock().unwrap() = Some(client.callback_stub());
    client.register("client-a").unwrap();
    assert_eq!(service.client_count(), 1);

    // The connection dies; the next push notices and drops the entry, but
    // the inbound call that triggered the push still succeeds.
    alive.store(false, Ordering::SeqCst);
    client.send_window_status(true).unwrap();
    assert_eq!(service.client_count(), 0);
}

#[test]
fn test_registration_rolls_back_when_initial_push_fails() {
    let alive = Arc::new(AtomicBool::new(false));
    let connector = Arc::new(KillableConnector {
        stub: Mutex::new(None),
        alive,
    });
    let service = Arc::new(ImeDisplayService::with_display(connector.clone(), 4).unwrap());
    let stub = Arc::new(ImeManagerStub::new(service.clone()));
    let client = ImeClientManager::new(Arc::new(LoopbackTransport::new(stub)));

    *connector.stub.lock().unwrap() = Some(client.callback_stub());
    assert!(client.register("client-a").is_err());
    assert_eq!(service.client_count(), 0);
}
