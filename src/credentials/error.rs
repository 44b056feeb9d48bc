use thiserror::Error;

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("CredentialError - MissingEnvVar: {0} is not set")]
    MissingEnvVar(String),
    #[error("CredentialError - EmptyPassphrase")]
    EmptyPassphrase,
    #[error("CredentialError - IO: {0}")]
    IO(#[from] std::io::Error),
    #[error("CredentialError - JoinError: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}
