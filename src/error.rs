use thiserror::Error;

/// Structured error context for configuration and validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Configuration key or parameter that caused the error (e.g., "locale", "BATTLENET_MAX_CONNECTIONS")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., allowed values, raw input)
    pub details: Option<String>,
    /// Source of the error (e.g., "client_builder", "config_env")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for configuration, enqueue and pre-flight failures.
///
/// Per-request transport failures are never surfaced here; they reach the
/// completion handler through [`crate::transport::TransportMetadata`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("An API key is required to interact with the Battle.net API services")]
    MissingCredential,

    #[error("HTTP transport is not available: {reason}")]
    TransportUnavailable { reason: String },

    #[error("There were no requests to be sent")]
    EmptyBatch,

    #[error("The service/endpoint combination \"{service}/{endpoint}\" does not exist or is not yet implemented")]
    EndpointResolution { service: String, endpoint: String },

    #[error("The \"{endpoint}\" endpoint requires the parameter(s) {}", quote_all(.parameters))]
    MissingParameter {
        endpoint: String,
        parameters: Vec<String>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

fn quote_all(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("\"{}\"", n))
        .collect::<Vec<_>>()
        .join(" and ")
}

impl Error {
    /// Create a configuration error without extra context.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn transport_unavailable(reason: impl Into<String>) -> Self {
        Error::TransportUnavailable {
            reason: reason.into(),
        }
    }

    pub fn missing_parameter(endpoint: impl Into<String>, parameters: &[&str]) -> Self {
        Error::MissingParameter {
            endpoint: endpoint.into(),
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } => Some(context),
            _ => None,
        }
    }

    /// True for errors raised by send-time pre-flight checks.
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            Error::MissingCredential | Error::TransportUnavailable { .. } | Error::EmptyBatch
        )
    }
}
