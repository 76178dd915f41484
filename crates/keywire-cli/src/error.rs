use std::fmt;
use std::process::ExitCode;

use keywire_keymap::KeymapError;
use keywire_render::RenderError;
use keywire_route::RouteError;

/// Process exit status for each failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorCode {
    /// Bad arguments or flag values.
    Usage = 1,
    /// The project cannot be routed as written: unreadable file, bad YAML or
    /// KLE, unknown wire names, keys without terminals.
    Input = 2,
    /// Solver or output failure on a valid project.
    Processing = 3,
}

impl From<ErrorCode> for ExitCode {
    fn from(code: ErrorCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: ErrorCode,
    pub message: String,
}

impl CliError {
    pub fn new(code: ErrorCode, message: impl fmt::Display) -> Self {
        Self {
            code,
            message: message.to_string(),
        }
    }

    pub fn usage(message: impl fmt::Display) -> Self {
        Self::new(ErrorCode::Usage, message)
    }

    pub fn processing(message: impl fmt::Display) -> Self {
        Self::new(ErrorCode::Processing, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<keywire_project::Error> for CliError {
    fn from(e: keywire_project::Error) -> Self {
        Self::new(ErrorCode::Input, e)
    }
}

impl From<RouteError> for CliError {
    fn from(e: RouteError) -> Self {
        let code = match e {
            RouteError::Config(_) => ErrorCode::Input,
            RouteError::Internal(_) => ErrorCode::Processing,
        };
        Self::new(code, e)
    }
}

impl From<KeymapError> for CliError {
    fn from(e: KeymapError) -> Self {
        let code = match e {
            KeymapError::Serialize(_) => ErrorCode::Processing,
            _ => ErrorCode::Input,
        };
        Self::new(code, e)
    }
}

impl From<RenderError> for CliError {
    fn from(e: RenderError) -> Self {
        Self::processing(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keywire_route::{ConfigError, InternalError};

    #[test]
    fn route_errors_split_by_cause() {
        let config: CliError = RouteError::Config(ConfigError::InvalidTurningRadius { radius: 0.0 }).into();
        assert_eq!(config.code, ErrorCode::Input);
        let internal: CliError = RouteError::Internal(InternalError::ThreadPool("x".into())).into();
        assert_eq!(internal.code, ErrorCode::Processing);
    }
}
