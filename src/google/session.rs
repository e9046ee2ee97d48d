//! Session holding the credential for the signed-in Gmail account

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::Mutex;

use super::error::MailError;
use super::oauth::Credential;

/// Explicitly passed credential holder. Cloning shares the underlying
/// credential. When a token path is set the credential is mirrored to
/// that file so a restart keeps the user signed in.
#[derive(Clone, Debug, Default)]
pub struct Session {
    credential: Arc<RwLock<Option<Credential>>>,
    token_path: Option<PathBuf>,
    // Held across each update of the credential and its token file so a
    // file write can't land after a later clear
    update: Arc<Mutex<()>>,
}

impl Session {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Create a session backed by `token_path`, loading any credential
    /// already stored there. An unreadable or corrupt file is logged and
    /// treated as signed out.
    pub async fn load(token_path: PathBuf) -> Self {
        let credential = match tokio::fs::read_to_string(&token_path).await {
            Ok(content) => match serde_json::from_str::<Credential>(&content) {
                Ok(credential) => Some(credential),
                Err(e) => {
                    tracing::warn!("Ignoring corrupt token file {}: {}", token_path.display(), e);
                    None
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!("Could not read token file {}: {}", token_path.display(), e);
                None
            }
        };

        Self {
            credential: Arc::new(RwLock::new(credential)),
            token_path: Some(token_path),
            update: Arc::default(),
        }
    }

    pub fn credential(&self) -> Option<Credential> {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.credential().is_some()
    }

    /// Replace the current credential. The in-memory value is always
    /// updated, even when writing the token file fails.
    pub async fn store(&self, credential: Credential) -> Result<(), MailError> {
        let _update = self.update.lock().await;
        *self
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(credential.clone());
        self.write_token_file(&credential).await
    }

    /// Replace the credential only if the session still holds `previous`.
    /// Returns false, leaving memory and the token file untouched, when the
    /// session was cleared or given another credential in the meantime.
    pub async fn store_if_current(
        &self,
        previous: &Credential,
        credential: Credential,
    ) -> Result<bool, MailError> {
        let _update = self.update.lock().await;
        {
            let mut current = self
                .credential
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            if current.as_ref() != Some(previous) {
                return Ok(false);
            }
            *current = Some(credential.clone());
        }
        self.write_token_file(&credential).await?;
        Ok(true)
    }

    async fn write_token_file(&self, credential: &Credential) -> Result<(), MailError> {
        let Some(path) = &self.token_path else {
            return Ok(());
        };
        let content = serde_json::to_string(credential)
            .map_err(|e| MailError::CredentialStore(e.to_string()))?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| MailError::CredentialStore(e.to_string()))?;
        }
        tokio::fs::write(path, content)
            .await
            .map_err(|e| MailError::CredentialStore(e.to_string()))
    }

    /// Forget the credential. Clearing an already empty session succeeds.
    pub async fn clear(&self) -> Result<(), MailError> {
        let _update = self.update.lock().await;
        self.credential
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(path) = &self.token_path {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(MailError::CredentialStore(format!(
                        "{}: {}",
                        path.display(),
                        e
                    )));
                }
            }
        }

        Ok(())
    }
}
