mod session;
mod submission;

pub use session::{DataType, Month, SessionConfig};
pub use submission::{MeasurementRow, PendingSubmission, SheetRow, SubmissionOutcome};
