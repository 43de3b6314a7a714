pub mod class;
pub mod record;
pub mod report;
pub mod student;

pub use class::ClassSummary;
pub use record::{AttendanceEntry, AttendanceRecord};
pub use report::{ClassStatistics, HealthStatus, StoredRecord, StudentStatistics};
pub use student::{RosterEntry, Student, StudentId};
