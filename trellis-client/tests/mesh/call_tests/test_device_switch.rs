use std::time::Duration;

use trellis_client::DeviceId;
use trellis_core::model::MediaKind;

use crate::call_tests::connected_pair;
use crate::utils::{BACK_CAMERA, RelayHarness, SIGNAL_TIMEOUT_MS, wait_for_snapshot};
use crate::{init_tracing, video_room};

#[tokio::test(flavor = "multi_thread")]
async fn test_switching_cameras_keeps_the_call_alive() {
    init_tracing();

    let harness = RelayHarness::new(video_room());
    let ((_, alice), (_, _bob)) = connected_pair(&harness).await;

    alice
        .switch_device(MediaKind::Video, DeviceId::from(BACK_CAMERA))
        .await
        .unwrap();

    let mut alice_view = alice.watch();
    assert!(
        wait_for_snapshot(&mut alice_view, SIGNAL_TIMEOUT_MS, |snapshot| {
            snapshot
                .local_stream
                .as_ref()
                .and_then(|stream| stream.video.as_ref())
                .map(|track| track.device().id == DeviceId::from(BACK_CAMERA))
                .unwrap_or(false)
        })
        .await
    );

    // No renegotiation: the transport stays connected throughout.
    tokio::time::sleep(Duration::from_millis(500)).await;
    let snapshot = alice.snapshot();
    assert_eq!(snapshot.connected_peers().count(), 1);
    assert!(snapshot.capture_error.is_none());
}
