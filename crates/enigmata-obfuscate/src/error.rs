use enigmata_depgraph::GraphError;
use enigmata_rename::RenameError;
use enigmata_traverse::MalformedDocument;

/// Failure inside a single traversal.
#[derive(Debug, thiserror::Error)]
pub enum ObfuscateError {
    #[error(transparent)]
    Rename(#[from] RenameError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// A failure attributed to one document of a run.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("{document}: {source}")]
    Malformed {
        document: String,
        source: MalformedDocument,
    },

    #[error("{document}: {source}")]
    Rename {
        document: String,
        source: ObfuscateError,
    },
}

impl DocumentError {
    pub(crate) fn malformed(document: &str, source: MalformedDocument) -> Self {
        Self::Malformed {
            document: document.to_string(),
            source,
        }
    }

    pub(crate) fn rename(document: &str, source: impl Into<ObfuscateError>) -> Self {
        Self::Rename {
            document: document.to_string(),
            source: source.into(),
        }
    }

    pub fn document(&self) -> &str {
        match self {
            Self::Malformed { document, .. } | Self::Rename { document, .. } => document,
        }
    }

    /// Rename failures corrupt the shared tables and must end the run;
    /// malformed documents are skipped.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Malformed { .. })
    }
}
