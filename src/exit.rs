//! Process exit codes.
//!
//! Each code is a stable contract for scripts; every [`Error`] kind maps to
//! exactly one of them through [`ExitStatus::for_error`].

use std::io;
use std::process::ExitCode;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    Success = 0,
    Generic = 1,
    Network = 2,
    Api = 3,
    NotFound = 4,
    InvalidInput = 5,
    Filesystem = 6,
    Permission = 7,
    Timeout = 8,
    ApiUnhealthy = 10,
    /// Conventional code for SIGINT (128 + 2).
    Interrupted = 130,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn for_error(err: &Error) -> Self {
        match err {
            Error::Authentication(_) | Error::Api { .. } | Error::Decode(_) => ExitStatus::Api,
            Error::NotFound(_) => ExitStatus::NotFound,
            Error::Validation(_) | Error::InvalidInput(_) => ExitStatus::InvalidInput,
            Error::Network(_) => ExitStatus::Network,
            Error::Timeout(_) => ExitStatus::Timeout,
            Error::Io(e) if e.kind() == io::ErrorKind::PermissionDenied => ExitStatus::Permission,
            Error::Io(_) | Error::Archive(_) => ExitStatus::Filesystem,
            Error::Unhealthy(_) => ExitStatus::ApiUnhealthy,
            Error::Internal(_) => ExitStatus::Generic,
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}
