use std::error::Error as StdError;

use thiserror::Error;

pub type PushResult<T> = Result<T, PushError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushErrorKind {
    /// The service answered with a non-2xx status and a `detail`.
    Rejected,
    /// Connect, send or receive failed below HTTP.
    Transport,
    /// A response body was not the JSON the client expects.
    Decode,
    /// The request could not be serialized.
    Encode,
}

/// Failure of a push call. `Display` is exactly the caller-facing message.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct PushError {
    kind: PushErrorKind,
    status: Option<u16>,
    message: String,
}

impl PushError {
    pub fn new(kind: PushErrorKind, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
        }
    }

    pub fn rejected(status: u16, detail: impl AsRef<str>) -> Self {
        Self::new(
            PushErrorKind::Rejected,
            Some(status),
            format!("Error: {status}, {}", detail.as_ref()),
        )
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(PushErrorKind::Transport, None, message)
    }

    pub fn decode(status: Option<u16>, err: sonic_rs::Error) -> Self {
        Self::new(PushErrorKind::Decode, status, err.to_string())
    }

    pub fn encode(err: sonic_rs::Error) -> Self {
        Self::new(PushErrorKind::Encode, None, err.to_string())
    }

    /// Keeps the whole cause chain; reqwest's top-level text alone omits the OS error.
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        Self::new(PushErrorKind::Transport, status, error_chain(&err))
    }

    pub fn kind(&self) -> PushErrorKind {
        self.kind
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// `outer: cause: root cause`, skipping levels that repeat their parent's text.
pub(crate) fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut last = message.clone();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !text.is_empty() && !last.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        last = text;
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use std::{fmt, io};

    use super::*;

    #[derive(Debug)]
    struct Wrapped {
        text: &'static str,
        cause: io::Error,
    }

    impl fmt::Display for Wrapped {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.text)
        }
    }

    impl StdError for Wrapped {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.cause)
        }
    }

    #[test]
    fn error_chain_joins_every_cause() {
        let err = Wrapped {
            text: "error sending request",
            cause: io::Error::new(io::ErrorKind::ConnectionRefused, "Connection refused"),
        };
        assert_eq!(error_chain(&err), "error sending request: Connection refused");
    }

    #[test]
    fn error_chain_without_source_is_the_plain_message() {
        let err = io::Error::other("tcp connect error");
        assert_eq!(error_chain(&err), "tcp connect error");
    }
}
