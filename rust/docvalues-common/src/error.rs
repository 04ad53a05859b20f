use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    /// Returns `true` if the error reports damaged or unsupported persisted data,
    /// including checksum failures.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Corruption { .. } | ErrorKind::ChecksumMismatch { .. }
        )
    }

    pub fn is_contract_violation(&self) -> bool {
        matches!(self.kind(), ErrorKind::ContractViolation { .. })
    }

    pub fn corruption(element: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::Corruption {
                element: element.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn checksum_mismatch(element: impl Into<String>) -> Error {
        Error(
            ErrorKind::ChecksumMismatch {
                element: element.into(),
            }
            .into(),
        )
    }

    pub fn contract_violation(message: impl Into<String>) -> Error {
        Error(
            ErrorKind::ContractViolation {
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        Error(ErrorKind::InvalidOperation { name: name.into() }.into())
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        Error(
            ErrorKind::Io {
                context: context.into(),
                source,
            }
            .into(),
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },

    #[error("contract violation: {message}")]
    ContractViolation { message: String },

    #[error("checksum mismatch for '{element}'")]
    ChecksumMismatch { element: String },

    #[error("corrupt data in '{element}': {message}")]
    Corruption { element: String, message: String },

    #[error("IO error for '{context}': {source}'")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("", e)
    }
}

impl From<std::convert::Infallible> for Error {
    fn from(_: std::convert::Infallible) -> Self {
        Error::invalid_operation("conversion")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(Error::corruption("meta", "bad tag").is_corruption());
        assert!(Error::checksum_mismatch("data").is_corruption());
        assert!(!Error::contract_violation("closed").is_corruption());
        assert!(Error::contract_violation("closed").is_contract_violation());

        let io: Error = std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into();
        assert!(matches!(io.kind(), ErrorKind::Io { .. }));
        assert!(!io.is_corruption());
    }

    #[test]
    fn test_error_display() {
        let e = Error::corruption("dictionary", "ord count mismatch");
        assert_eq!(
            e.to_string(),
            "corrupt data in 'dictionary': ord count mismatch"
        );
    }
}
