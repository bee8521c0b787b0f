// Contact pipeline: payload validation, durable storage, best-effort email
// relay with provider fallback.

pub mod email;
pub mod store;
pub mod submission;

pub use email::{ContactEmail, EmailError, EmailProvider, Mailer, ResendProvider, SmtpProvider};
pub use store::{StoredSubmission, SubmissionStore};
pub use submission::{ContactPayload, ContactSubmission, FieldError};
