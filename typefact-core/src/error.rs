/// Top-level typefact error type.
///
/// Classification itself is total and never fails; these errors come from the
/// edges of the system: parsing sources, loading configuration and reading the
/// JDK or dependency fact files.
#[derive(thiserror::Error, Debug)]
pub enum TypeFactError {
    /// Error from the type graph engine (tree-sitter parsing, type syntax).
    #[error("Graph engine error: {0}")]
    Graph(#[from] typefact_graphs::GraphError),

    /// Error in configuration parsing or validation.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error loading the JDK type inventory.
    #[error("JDK index error: {0}")]
    Jdk(#[from] JdkError),

    /// Error loading external dependency facts.
    #[error("Dependency error: {0}")]
    Dependency(#[from] DependencyError),
}

/// Problems with a `typefact.toml` document.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("malformed typefact.toml: {0}")]
    Parse(#[from] toml::de::Error),

    /// Well-formed, but a value is out of range.
    #[error("{key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Errors reading a JDK type inventory.
#[derive(thiserror::Error, Debug)]
pub enum JdkError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Malformed JDK index: {0}")]
    Format(#[from] serde_json::Error),
}

/// Errors reading per-jar dependency facts.
#[derive(thiserror::Error, Debug)]
pub enum DependencyError {
    /// No facts file exists for the jar under any of its candidate names.
    #[error("No facts for {0}")]
    Missing(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed dependency facts: {0}")]
    Format(#[from] serde_json::Error),
}

/// Convenience alias for `Result<T, TypeFactError>`.
pub type Result<T> = std::result::Result<T, TypeFactError>;
