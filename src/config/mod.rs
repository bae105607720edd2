use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::ast::{Dialect, Value};
use crate::error::AnvilError;
use crate::module::{Module, SourceId};
use crate::parser;

mod access;
mod conversion;


pub use access::Lookup;

/// Main configuration handle over a parsed, immutable [`Module`].
///
/// The module is held behind an `Arc`: readers take [`snapshot`]s and hot
/// reload is whole-module replacement: parse a new config and swap the
/// handle, old snapshots stay valid until dropped.
///
/// [`snapshot`]: AnvilConfig::snapshot
pub struct AnvilConfig {
    module: Arc<Module>,
}

impl AnvilConfig {
    /// Load an ANVIL configuration file from disk.
    ///
    /// The file extension selects the dialect hint (`.aml` strict, `.asl`
    /// permissive); a shebang in the file wins over the extension.
    ///
    /// # Example
    /// ```ignore
    /// let config = AnvilConfig::from_file("server.aml")?;
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AnvilError> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading configuration");

        let content = fs::read_to_string(path).map_err(|e| AnvilError::FileError {
            message: format!("Failed to read file: {}", e),
            path: path.display().to_string(),
            hint: Some("Check that the file exists and is readable".into()),
        })?;

        let hint = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Dialect::from_extension);

        Self::parse(&content, SourceId::File(path.to_path_buf()), hint)
    }

    /// Parse an ANVIL configuration from a string (no file I/O). The source
    /// is identified by the `<string>` sentinel and the dialect defaults to
    /// permissive unless a shebang says otherwise.
    pub fn from_str(content: &str) -> Result<Self, AnvilError> {
        Self::parse(content, SourceId::Text, None)
    }

    fn parse(content: &str, source: SourceId, hint: Option<Dialect>) -> Result<Self, AnvilError> {
        match parser::parse_module(content, source, hint) {
            Ok(module) => {
                tracing::debug!(
                    namespace = %module.namespace(),
                    keys = module.statements().len(),
                    dialect = module.dialect().as_str(),
                    "parsed module"
                );
                Ok(AnvilConfig {
                    module: Arc::new(module),
                })
            }
            Err(failure) => {
                tracing::warn!(errors = failure.total, "parse failed");
                Err(AnvilError::Parse {
                    errors: failure.errors,
                    total: failure.total,
                })
            }
        }
    }

    /// The parsed module.
    pub fn module(&self) -> &Module {
        &self.module
    }

    /// A shared reference to the module, for readers that outlive this
    /// handle (hot reload keeps old snapshots alive until dropped).
    pub fn snapshot(&self) -> Arc<Module> {
        Arc::clone(&self.module)
    }
}

impl Lookup for AnvilConfig {
    fn label(&self) -> &str {
        self.module.namespace()
    }

    fn value_of(&self, key: &str) -> Option<&Value> {
        self.module.lookup(key)
    }

    fn keys(&self) -> Vec<&str> {
        self.module.key_names()
    }
}
