use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    #[error("Gesture rejected: {0}")]
    Gesture(#[from] GestureError),

    #[error("System error: {message}")]
    System { message: String },

    #[error("Component error in {component}: {message}")]
    Component { component: String, message: String },
}

impl DashboardError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }

    pub fn component<S: Into<String>>(component: S, message: S) -> Self {
        Self::Component {
            component: component.into(),
            message: message.into(),
        }
    }
}

/// Errors raised by the snapshot persistence adapters
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read storage entry {key}: {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write storage entry {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage entry {key} has an incompatible shape: {details}")]
    Corrupt { key: String, details: String },

    #[error("Failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Errors raised while serving the HTTP surface
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind to {address}: {source}")]
    BindFailed {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server startup failed: {details}")]
    StartupFailed { details: String },
}

/// A user gesture that the current view does not accept
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GestureError {
    #[error("{target} {id} not found")]
    NotFound { target: &'static str, id: String },

    #[error("{action} is disabled for {id}: {reason}")]
    Disabled {
        action: &'static str,
        id: String,
        reason: &'static str,
    },
}

impl GestureError {
    pub fn device_not_found<S: Into<String>>(id: S) -> Self {
        Self::NotFound {
            target: "device",
            id: id.into(),
        }
    }

    pub fn camera_not_found<S: Into<String>>(id: S) -> Self {
        Self::NotFound {
            target: "camera",
            id: id.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum EventBusError {
    #[error("Failed to publish event: {details}")]
    PublishFailed { details: String },

    #[error("Event receiver lagged behind by {0} events")]
    Lagged(u64),

    #[error("Event channel closed")]
    ChannelClosed,
}

pub type Result<T> = std::result::Result<T, DashboardError>;
