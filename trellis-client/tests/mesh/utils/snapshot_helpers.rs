use std::time::Duration;
use tokio::sync::watch;

use trellis_client::MeshSnapshot;

/// Timeout for waiting on signaling round trips.
pub const SIGNAL_TIMEOUT_MS: u64 = 5000;

/// Window after which a message is considered dropped.
pub const DROP_WINDOW_MS: u64 = 200;

/// Timeout for full ICE and DTLS establishment between in-process peers.
pub const CONNECT_TIMEOUT_MS: u64 = 30_000;

/// Waits until a published snapshot satisfies `predicate`.
pub async fn wait_for_snapshot(
    rx: &mut watch::Receiver<MeshSnapshot>,
    timeout_ms: u64,
    predicate: impl Fn(&MeshSnapshot) -> bool,
) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);

    loop {
        if predicate(&rx.borrow_and_update()) {
            return true;
        }
        match tokio::time::timeout_at(deadline, rx.changed()).await {
            Ok(Ok(())) => continue,
            _ => return predicate(&rx.borrow_and_update()),
        }
    }
}
