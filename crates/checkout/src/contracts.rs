//! Access to stored credit contracts.

use bytes::Bytes;
use domain::CustomerId;

use crate::document::contract_directory;
use crate::error::Result;
use crate::services::documents::DocumentStore;

/// Lists, serves and removes the contracts stored for customers.
pub struct ContractArchive<D: DocumentStore> {
    documents: D,
}

impl<D: DocumentStore> ContractArchive<D> {
    /// Creates a new archive over a document store.
    pub fn new(documents: D) -> Self {
        Self { documents }
    }

    /// File names of a customer's contracts. Empty if the store fails.
    #[tracing::instrument(skip(self))]
    pub async fn list_customer_contracts(&self, customer_id: &CustomerId) -> Vec<String> {
        match self.documents.list(&contract_directory(customer_id)).await {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!(error = %e, "listing contracts failed");
                Vec::new()
            }
        }
    }

    /// Reads one contract.
    #[tracing::instrument(skip(self))]
    pub async fn download_contract(
        &self,
        customer_id: &CustomerId,
        file_name: &str,
    ) -> Result<Bytes> {
        self.documents
            .download(&contract_directory(customer_id), file_name)
            .await
    }

    /// Deletes one contract. Returns false if it was absent or the store
    /// failed.
    #[tracing::instrument(skip(self))]
    pub async fn delete_contract(&self, customer_id: &CustomerId, file_name: &str) -> bool {
        match self
            .documents
            .delete(&contract_directory(customer_id), file_name)
            .await
        {
            Ok(deleted) => deleted,
            Err(e) => {
                tracing::warn!(error = %e, "deleting contract failed");
                false
            }
        }
    }

    /// Path under which the HTTP surface serves a contract.
    pub fn download_path(customer_id: &CustomerId, file_name: &str) -> String {
        format!("/customers/{customer_id}/contracts/{file_name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InMemoryDocumentStore;

    #[tokio::test]
    async fn list_download_delete() {
        let store = InMemoryDocumentStore::new();
        store
            .upload("c1/orders", "AB12CD34-contract.pdf", Bytes::from_static(b"%PDF"))
            .await
            .unwrap();
        let archive = ContractArchive::new(store);
        let customer = CustomerId::new("c1");

        assert_eq!(
            archive.list_customer_contracts(&customer).await,
            vec!["AB12CD34-contract.pdf".to_string()]
        );
        let content = archive
            .download_contract(&customer, "AB12CD34-contract.pdf")
            .await
            .unwrap();
        assert_eq!(&content[..], b"%PDF");

        assert!(archive.delete_contract(&customer, "AB12CD34-contract.pdf").await);
        assert!(!archive.delete_contract(&customer, "AB12CD34-contract.pdf").await);
        assert!(archive.list_customer_contracts(&customer).await.is_empty());
    }

    #[tokio::test]
    async fn missing_contract_is_not_found() {
        let archive = ContractArchive::new(InMemoryDocumentStore::new());
        let err = archive
            .download_contract(&CustomerId::new("c1"), "nope.pdf")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn download_path() {
        assert_eq!(
            ContractArchive::<InMemoryDocumentStore>::download_path(
                &CustomerId::new("c1"),
                "A-contract.pdf"
            ),
            "/customers/c1/contracts/A-contract.pdf"
        );
    }
}
