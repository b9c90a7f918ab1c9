use std::{fmt, io, string::FromUtf16Error};

use crate::hresult::HResult;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    #[cfg(windows)]
    Windows(windows::core::Error),
    Utf16(FromUtf16Error),
    Json(serde_json::Error),
    InvalidGuid(String),
    InvalidFilter(String),
    InvalidOption(String),
    InvalidConfig(String),
    /// The operation exists on a sibling interface but not on this dialog kind.
    Unsupported(&'static str),
}

impl Error {
    /// The HRESULT carried by this error, if it came back from a COM call.
    pub fn hresult(&self) -> Option<HResult> {
        match self {
            #[cfg(windows)]
            Error::Windows(err) => Some(HResult::from(err.code())),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.hresult() == Some(HResult::CANCELLED)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            #[cfg(windows)]
            Error::Windows(err) => Some(err),
            Error::Utf16(err) => Some(err),
            Error::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(windows)]
impl From<windows::core::Error> for Error {
    fn from(err: windows::core::Error) -> Error {
        Error::Windows(err)
    }
}

impl From<FromUtf16Error> for Error {
    fn from(err: FromUtf16Error) -> Error {
        Error::Utf16(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::Json(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        use Error::*;
        match self {
            Io(ref err) => err.fmt(fmt),
            #[cfg(windows)]
            Windows(ref err) => write!(fmt, "{} ({})", err.message(), HResult::from(err.code())),
            Utf16(ref err) => err.fmt(fmt),
            Json(ref err) => err.fmt(fmt),
            InvalidGuid(ref s) => write!(fmt, "invalid GUID: {s:?}"),
            InvalidFilter(ref s) => write!(fmt, "invalid file filter: {s}"),
            InvalidOption(ref s) => write!(fmt, "unknown dialog option: {s:?}"),
            InvalidConfig(ref s) => write!(fmt, "invalid dialog configuration: {s}"),
            Unsupported(ref what) => write!(fmt, "{what} is not supported by this dialog"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = Error::InvalidGuid("nope".into());
        assert_eq!(err.to_string(), "invalid GUID: \"nope\"");

        let err = Error::Unsupported("GetResults");
        assert_eq!(err.to_string(), "GetResults is not supported by this dialog");
    }

    #[test]
    fn non_com_errors_carry_no_hresult() {
        let err = Error::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.hresult(), None);
        assert!(!err.is_cancelled());
        assert!(std::error::Error::source(&err).is_some());
    }
}
