use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': {value} - {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required field: {field}")]
    MissingConfigError { field: String },

    #[error("Form error in '{field}': {reason}")]
    FormError { field: String, reason: String },

    #[error("Unexpected response: {message}")]
    ResponseError { message: String },

    #[error("Unsupported calculator type: {0}")]
    UnsupportedCalculator(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Server,
    Input,
    Configuration,
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// Static user-facing message for an HTTP status code.
pub fn status_message(status: u16) -> String {
    match status {
        400 => "Solicitud incorrecta - Datos inválidos".to_string(),
        401 => "No autorizado - Sesión expirada".to_string(),
        403 => "Acceso denegado".to_string(),
        404 => "Recurso no encontrado".to_string(),
        408 => "Tiempo de espera agotado".to_string(),
        500 => "Error interno del servidor".to_string(),
        502 => "Error de conexión con el servidor".to_string(),
        503 => "Servicio no disponible temporalmente".to_string(),
        504 => "Tiempo de espera del servidor agotado".to_string(),
        code => format!("Error del servidor (Código: {})", code),
    }
}

impl AppError {
    pub fn form(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::FormError {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Http { status, .. } => Some(*status),
            AppError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::Transport(_) => ErrorCategory::Network,
            AppError::Http { status, .. } if *status < 500 => ErrorCategory::Input,
            AppError::Http { .. } | AppError::ResponseError { .. } => ErrorCategory::Server,
            AppError::FormError { .. } | AppError::UnsupportedCalculator(_) => {
                ErrorCategory::Input
            }
            AppError::ConfigError { .. }
            | AppError::InvalidConfigValueError { .. }
            | AppError::MissingConfigError { .. }
            | AppError::UrlError(_) => ErrorCategory::Configuration,
            AppError::ZipError(_)
            | AppError::CsvError(_)
            | AppError::IoError(_)
            | AppError::SerializationError(_) => ErrorCategory::Local,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Network | ErrorCategory::Server => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Local => ErrorSeverity::Critical,
        }
    }

    /// Message shown to the user as a transient notice.
    pub fn user_friendly_message(&self) -> String {
        match self {
            AppError::Http { status, .. } => status_message(*status),
            AppError::Transport(e) if e.is_timeout() => {
                "Tiempo de espera agotado. Intente nuevamente.".to_string()
            }
            AppError::Transport(e) if e.is_connect() => {
                "Error de conexión. Verifique su internet.".to_string()
            }
            AppError::Transport(e) => match e.status() {
                Some(status) => status_message(status.as_u16()),
                None => format!("Error inesperado: {}", e),
            },
            AppError::FormError { field, reason } => format!("{}: {}", field, reason),
            AppError::MissingConfigError { field } => {
                format!("El campo {} es requerido", field)
            }
            AppError::UnsupportedCalculator(code) => {
                format!("Tipo de calculadora no soportado: {}", code)
            }
            AppError::ResponseError { message } => {
                format!("Error al procesar respuesta: {}", message)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            AppError::Http { status: 401, .. } | AppError::Http { status: 403, .. } => {
                "Verifique sus credenciales o permisos"
            }
            AppError::Http { status: 404, .. } => "Verifique que el recurso exista en el servidor",
            AppError::Http { status, .. } if *status < 500 => "Revise los datos enviados",
            AppError::Http { .. } => "Intente nuevamente en unos minutos",
            AppError::Transport(_) => "Verifique la conexión y la URL del servidor",
            AppError::FormError { .. } | AppError::UnsupportedCalculator(_) => {
                "Corrija los campos del formulario"
            }
            AppError::ConfigError { .. }
            | AppError::InvalidConfigValueError { .. }
            | AppError::MissingConfigError { .. }
            | AppError::UrlError(_) => "Revise el archivo de configuración y los argumentos",
            AppError::ResponseError { .. } | AppError::SerializationError(_) => {
                "La respuesta del servidor no tiene el formato esperado"
            }
            AppError::ZipError(_) | AppError::CsvError(_) | AppError::IoError(_) => {
                "Verifique permisos y espacio en el directorio de salida"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_status_messages() {
        assert_eq!(status_message(400), "Solicitud incorrecta - Datos inválidos");
        assert_eq!(status_message(401), "No autorizado - Sesión expirada");
        assert_eq!(status_message(404), "Recurso no encontrado");
        assert_eq!(status_message(503), "Servicio no disponible temporalmente");
        assert_eq!(status_message(504), "Tiempo de espera del servidor agotado");
    }

    #[test]
    fn test_unknown_status_falls_back_to_code() {
        assert_eq!(status_message(418), "Error del servidor (Código: 418)");
    }

    #[test]
    fn test_http_error_classification() {
        let not_found = AppError::Http {
            status: 404,
            body: "{}".to_string(),
        };
        assert_eq!(not_found.category(), ErrorCategory::Input);
        assert_eq!(not_found.status(), Some(404));
        assert_eq!(not_found.user_friendly_message(), "Recurso no encontrado");

        let bad_gateway = AppError::Http {
            status: 502,
            body: String::new(),
        };
        assert_eq!(bad_gateway.category(), ErrorCategory::Server);
        assert_eq!(bad_gateway.severity(), ErrorSeverity::Medium);
    }

    #[test]
    fn test_form_error_message_names_field() {
        let err = AppError::form("area_to_paint", "es requerido");
        assert_eq!(err.user_friendly_message(), "area_to_paint: es requerido");
        assert_eq!(err.severity(), ErrorSeverity::High);
    }
}
