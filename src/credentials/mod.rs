pub mod error;

use async_trait::async_trait;

use std::sync::Arc;

use error::CredentialError;

/// Supplies the wallet passphrase when a caller does not pass one inline.
#[async_trait]
pub trait PassphraseSource: Send + Sync + 'static {
    async fn passphrase(&self) -> Result<String, CredentialError>;
}

pub type SharedPassphraseSource = Arc<dyn PassphraseSource>;

pub struct StaticPassphrase(String);

impl StaticPassphrase {
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self(passphrase.into())
    }
}

#[async_trait]
impl PassphraseSource for StaticPassphrase {
    async fn passphrase(&self) -> Result<String, CredentialError> {
        Ok(self.0.clone())
    }
}

pub struct EnvPassphrase {
    var: String,
}

impl EnvPassphrase {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

#[async_trait]
impl PassphraseSource for EnvPassphrase {
    async fn passphrase(&self) -> Result<String, CredentialError> {
        std::env::var(&self.var).map_err(|_| CredentialError::MissingEnvVar(self.var.clone()))
    }
}

/// Reads the passphrase from the controlling terminal without echo.
pub struct PromptPassphrase {
    prompt: String,
}

impl PromptPassphrase {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

impl Default for PromptPassphrase {
    fn default() -> Self {
        Self::new("> ")
    }
}

#[async_trait]
impl PassphraseSource for PromptPassphrase {
    async fn passphrase(&self) -> Result<String, CredentialError> {
        let prompt = self.prompt.clone();
        let passphrase = tokio::task::spawn_blocking(move || rpassword::prompt_password(prompt))
            .await??;
        if passphrase.is_empty() {
            return Err(CredentialError::EmptyPassphrase);
        }
        Ok(passphrase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_passphrase() {
        let source = StaticPassphrase::new("hunter2");
        assert_eq!(source.passphrase().await.unwrap(), "hunter2");
    }

    #[tokio::test]
    async fn missing_env_var() {
        let source = EnvPassphrase::new("PAYOUT_BATCHER_TEST_UNSET_PASSPHRASE");
        assert!(matches!(
            source.passphrase().await,
            Err(CredentialError::MissingEnvVar(_))
        ));
    }
}
