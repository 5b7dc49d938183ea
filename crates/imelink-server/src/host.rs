//! TCP hosting for the manager service.

use std::sync::Arc;

use imelink_binding::manager::ImeManagerStub;
use imelink_common::protocol::Result;
use imelink_common::transport::TcpServer;

use crate::service::ImeDisplayService;

/// Binds `bind_addr` and serves the `ImeManager` contract until the task is
/// cancelled or the listener fails.
pub async fn serve_manager(bind_addr: &str, service: Arc<ImeDisplayService>) -> Result<()> {
    let server = TcpServer::bind(bind_addr).await?;
    tracing::info!(addr = %server.local_addr()?, "IME manager listening");
    server.serve(Arc::new(ImeManagerStub::new(service))).await
}
