//! Document dereferencing for chain validators.

use std::collections::HashMap;
use std::future::Future;

/// Dereferences capability and key documents by ID.
///
/// Chain validators use this to turn bare identifiers (root capability
/// IDs above all) into documents. Loaders decide for themselves which
/// ID schemes they serve and how far they reach.
pub trait DocumentLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    fn load(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<serde_json::Value, Self::Error>> + Send;
}

/// A [`DocumentLoader`] over a fixed in-memory document set.
///
/// Suited to tests and to servers whose root capabilities are few and
/// known up front.
#[derive(Clone, Debug, Default)]
pub struct MemoryDocumentLoader {
    documents: HashMap<String, serde_json::Value>,
}

impl MemoryDocumentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a document under its ID.
    pub fn insert(&mut self, id: impl Into<String>, document: serde_json::Value) {
        self.documents.insert(id.into(), document);
    }

    /// Builder form of [`MemoryDocumentLoader::insert`].
    pub fn with_document(mut self, id: impl Into<String>, document: serde_json::Value) -> Self {
        self.insert(id, document);
        self
    }
}

/// The only way a memory loader fails.
#[derive(Debug, thiserror::Error)]
#[error("Document not found: {id}")]
pub struct DocumentNotFound {
    pub id: String,
}

impl DocumentLoader for MemoryDocumentLoader {
    type Error = DocumentNotFound;

    async fn load(&self, id: &str) -> Result<serde_json::Value, Self::Error> {
        self.documents
            .get(id)
            .cloned()
            .ok_or_else(|| DocumentNotFound { id: id.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loads_registered_documents() {
        let loader = MemoryDocumentLoader::new().with_document(
            "urn:zcap:root:1",
            serde_json::json!({ "id": "urn:zcap:root:1" }),
        );
        let document = loader.load("urn:zcap:root:1").await.expect("document");
        assert_eq!(document["id"], "urn:zcap:root:1");
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let loader = MemoryDocumentLoader::new();
        let result = loader.load("urn:zcap:root:missing").await;
        assert!(
            matches!(result, Err(DocumentNotFound { ref id }) if id == "urn:zcap:root:missing"),
            "Expected DocumentNotFound, got {result:?}"
        );
    }
}
