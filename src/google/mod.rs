pub mod body;
pub mod compose;
pub mod error;
pub mod gmail;
pub mod oauth;
pub mod session;

pub use error::MailError;
pub use gmail::GmailClient;
pub use session::Session;
