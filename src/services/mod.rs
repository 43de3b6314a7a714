pub mod board;
pub mod notifier;

pub use board::{AttendanceBoard, BoardSnapshot, Selection, Totals};
pub use notifier::{Notification, Notifier, Severity, NOTIFICATION_TIMEOUT};
