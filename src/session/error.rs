use thiserror::Error;

/// Ways a recording session can fail to run
#[derive(Error, Debug)]
pub enum SessionError {
    /// A setup step failed; the next supervisor tick may try again
    #[error("Session aborted during {step}: {cause:#}")]
    Aborted {
        step: &'static str,
        cause: anyhow::Error,
    },

    /// The encoder rejected its fixed settings; retrying cannot succeed
    #[error("Encoder rejected settings: {0:#}")]
    EncoderUnrecoverable(anyhow::Error),
}

impl SessionError {
    pub fn aborted(step: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |cause| Self::Aborted { step, cause }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::EncoderUnrecoverable(_))
    }
}
