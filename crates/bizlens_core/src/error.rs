use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("failed to start chat session: {0}")]
    SessionInit(#[source] bizlens_llms::Error),

    #[error("stream transmission failed: {0}")]
    StreamTransmission(String),

    #[error("a turn is already in progress")]
    TurnInFlight,

    #[error("message is empty")]
    EmptyMessage,

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ChatError>;
