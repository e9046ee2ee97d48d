use crate::google::{GmailClient, Session};

pub struct AppState {
    pub gmail: GmailClient,
    // Credential of the signed-in account, shared by every request
    pub session: Session,
}

impl AppState {
    pub fn new(gmail: GmailClient, session: Session) -> Self {
        Self { gmail, session }
    }
}
