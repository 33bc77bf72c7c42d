/// Errors that stop the exporter from starting or from serving a scrape.
///
/// Probe failures are not represented here. They are absorbed inside a
/// collection pass, see [`crate::collector::CollectError`].
#[derive(Debug, thiserror::Error)]
pub enum ExporterError {
    /// Two descriptors resolve to the same fully qualified metric name.
    #[error("duplicate metric descriptor: {0}")]
    DuplicateDescriptor(String),

    /// The namespace is not a valid metric name prefix.
    #[error("invalid metric namespace '{0}': must match [a-zA-Z_:][a-zA-Z0-9_:]*")]
    InvalidNamespace(String),

    #[error("invalid listen address '{address}': {reason}")]
    InvalidListenAddress { address: String, reason: String },

    #[error("invalid metrics path '{0}': must start with '/'")]
    InvalidMetricsPath(String),

    /// A previous pass panicked while holding the sampler lock.
    #[error("sampler lock poisoned by a panicked collection pass")]
    LockPoisoned,

    /// Registration or encoding failure inside the prometheus crate.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

pub type Result<T> = std::result::Result<T, ExporterError>;
