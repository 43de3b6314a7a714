mod common;

use std::time::Duration;

use attendance_board::services::{NOTIFICATION_TIMEOUT, Notifier, Severity};
use common::settle;

#[tokio::test(start_paused = true)]
async fn test_notification_hides_after_timeout() {
    let notifier = Notifier::new();
    notifier.notify("Saved", Severity::Success);

    tokio::time::sleep(NOTIFICATION_TIMEOUT - Duration::from_millis(1)).await;
    settle().await;
    let shown = notifier.visible().expect("still visible just before the timeout");
    assert_eq!(shown.message, "Saved");
    assert_eq!(shown.severity, Severity::Success);

    tokio::time::sleep(Duration::from_millis(1)).await;
    settle().await;
    assert!(notifier.visible().is_none());

    // the last message is kept, only hidden
    let last = notifier.current().unwrap();
    assert_eq!(last.message, "Saved");
    assert!(!last.visible);
}

#[tokio::test(start_paused = true)]
async fn test_second_notification_restarts_timer() {
    let notifier = Notifier::new();
    notifier.notify("first", Severity::Success);

    tokio::time::sleep(Duration::from_millis(2000)).await;
    notifier.notify("second", Severity::Error);

    // past the first message's deadline
    tokio::time::sleep(Duration::from_millis(1500)).await;
    settle().await;
    let shown = notifier.visible().expect("second message still visible");
    assert_eq!(shown.message, "second");
    assert_eq!(shown.severity, Severity::Error);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    settle().await;
    assert!(notifier.visible().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_custom_timeout() {
    let notifier = Notifier::with_timeout(Duration::from_millis(100));
    let id = notifier.notify("quick", Severity::Success);
    assert_eq!(notifier.current().unwrap().id, id);

    tokio::time::sleep(Duration::from_millis(150)).await;
    settle().await;
    assert!(notifier.visible().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_board_toast_uses_its_notifier() {
    use std::sync::Arc;

    use attendance_board::services::AttendanceBoard;
    use common::{ScriptedClient, clients};

    let client = Arc::new(ScriptedClient::new());
    let board = AttendanceBoard::with_notifier(
        clients(&client),
        Notifier::with_timeout(Duration::from_millis(500)),
    );

    board.submit().await;
    assert!(board.snapshot().notification.unwrap().visible);

    tokio::time::sleep(Duration::from_millis(500)).await;
    settle().await;
    assert!(board.notifier().visible().is_none());
}
