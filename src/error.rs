//! Crate-level error types for docsplice.

use std::path::PathBuf;

/// Hard failures that abort a command. Degraded outcomes during include
/// and reference resolution are reported through the logger contract
/// instead and never surface here.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The document passed on the command line is not part of the catalog.
    #[error("document not in catalog: {}", path.display())]
    DocumentNotInCatalog {
        /// Path to the document that could not be mapped.
        path: PathBuf,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// The docs root does not contain a `modules/` directory.
    #[error("not a docs root (missing modules/): {}", path.display())]
    NotADocsRoot {
        /// Path that was scanned.
        path: PathBuf,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),
}
