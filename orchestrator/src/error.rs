use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    #[error("PartyTown was not provided, resolve a PartyTownConfig and bind it before injecting")]
    ConfigurationMissing,

    #[error("injectScript() not called, initialize the analytics queue first")]
    NotInitialized,

    #[error("invalid page url '{0}'")]
    InvalidPageUrl(String),

    #[error("cannot build proxy endpoint from '{0}'")]
    InvalidProxyEndpoint(String),

    #[error("document mutation failed: {0}")]
    Document(String),

    #[error("data layer unavailable: {0}")]
    DataLayer(String),
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
