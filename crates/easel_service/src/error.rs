//! Errors reported back to inspection tools.

use easel_core::TaskError;
use serde_json::json;

use crate::protocol::DebugError;

pub const INVALID_PARAMS: i32 = -32602;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const SERVER_ERROR: i32 = -32000;

/// Failure of a single request. Never fatal to the process, never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("missing parameter: {0}")]
    MissingParameter(String),
    #[error("parameter: {name} has a bad value: {value}")]
    BadParameter { name: String, value: String },
    #[error("view not found: {0}")]
    UnknownView(String),
    #[error("{0}")]
    Server(String),
    #[error("Method not found: {0}")]
    MethodNotFound(String),
}

impl ProtocolError {
    pub fn missing(name: &str) -> Self {
        Self::MissingParameter(name.to_owned())
    }

    pub fn bad(name: &str, value: &str) -> Self {
        Self::BadParameter {
            name: name.to_owned(),
            value: value.to_owned(),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::MissingParameter(_) | Self::BadParameter { .. } | Self::UnknownView(_) => {
                INVALID_PARAMS
            }
            Self::Server(_) => SERVER_ERROR,
            Self::MethodNotFound(_) => METHOD_NOT_FOUND,
        }
    }

    /// The wire form of this error.
    pub fn to_debug_error(&self) -> DebugError {
        let details = match self {
            Self::MissingParameter(name) => Some(name.clone()),
            Self::BadParameter { .. } | Self::UnknownView(_) => Some(self.to_string()),
            Self::Server(_) | Self::MethodNotFound(_) => None,
        };
        let message = match details {
            Some(_) => "Invalid params".to_owned(),
            None => self.to_string(),
        };
        DebugError {
            code: self.code(),
            message,
            data: details.map(|details| json!({ "details": details })),
        }
    }
}

impl From<TaskError> for ProtocolError {
    fn from(e: TaskError) -> Self {
        Self::Server(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parameter_names_the_key() {
        let err = ProtocolError::missing("mainScript").to_debug_error();
        assert_eq!(err.code, INVALID_PARAMS);
        assert_eq!(err.message, "Invalid params");
        assert_eq!(err.data.unwrap()["details"], "mainScript");
    }

    #[test]
    fn bad_parameter_echoes_the_value() {
        let err = ProtocolError::bad("viewId", "view/12").to_debug_error();
        assert_eq!(err.code, INVALID_PARAMS);
        assert_eq!(
            err.data.unwrap()["details"],
            "parameter: viewId has a bad value: view/12"
        );
    }

    #[test]
    fn unknown_view_echoes_the_id() {
        let err = ProtocolError::UnknownView("_easelView/0x2a".into()).to_debug_error();
        assert_eq!(err.code, INVALID_PARAMS);
        assert_eq!(err.data.unwrap()["details"], "view not found: _easelView/0x2a");
    }

    #[test]
    fn server_error_has_no_data() {
        let err = ProtocolError::Server("can not encode screenshot".into()).to_debug_error();
        assert_eq!(err.code, SERVER_ERROR);
        assert_eq!(err.message, "can not encode screenshot");
        assert!(err.data.is_none());
    }

    #[test]
    fn method_not_found_names_the_method() {
        let err = ProtocolError::MethodNotFound("nope".into()).to_debug_error();
        assert_eq!(err.code, METHOD_NOT_FOUND);
        assert_eq!(err.message, "Method not found: nope");
    }

    #[test]
    fn task_errors_become_server_errors() {
        let err: ProtocolError = TaskError::Terminated("host.gpu".into()).into();
        assert_eq!(err.code(), SERVER_ERROR);
        assert_eq!(err.to_string(), "host.gpu thread is not accepting tasks");
    }
}
