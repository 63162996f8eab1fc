//! Credit contract documents.

use bytes::Bytes;
use common::OrderId;
use domain::CustomerId;

use crate::error::{CheckoutError, Result};

/// File extensions accepted for contracts.
pub const ALLOWED_EXTENSIONS: &[&str] = &[".pdf", ".doc", ".docx", ".jpg", ".jpeg", ".png"];

/// Largest accepted contract (5 MiB).
pub const MAX_CONTRACT_BYTES: usize = 5 * 1024 * 1024;

/// A contract uploaded with a credit checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractDocument {
    /// Name of the file as uploaded.
    pub file_name: String,
    pub content: Bytes,
}

impl ContractDocument {
    /// Creates a contract document.
    pub fn new(file_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }

    /// Returns true if the document carries no bytes.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Returns the lower-cased extension including the dot, if any.
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name.rsplit(['/', '\\']).next().unwrap_or_default();
        let dot = name.rfind('.')?;
        Some(name[dot..].to_ascii_lowercase())
    }

    /// Checks the document against the type allow-list and size ceiling.
    ///
    /// Returns the normalized extension on success.
    pub fn validate(&self) -> Result<String> {
        if self.is_empty() {
            return Err(CheckoutError::ContractRequired);
        }

        let extension = self
            .extension()
            .filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
            .ok_or_else(|| {
                CheckoutError::InvalidDocument(
                    "Only PDF, Word documents, and images (JPG, PNG) are allowed".to_string(),
                )
            })?;

        if self.content.len() > MAX_CONTRACT_BYTES {
            return Err(CheckoutError::InvalidDocument(
                "Contract file must be 5MB or smaller".to_string(),
            ));
        }

        Ok(extension)
    }
}

/// Directory holding a customer's contracts.
pub fn contract_directory(customer_id: &CustomerId) -> String {
    format!("{customer_id}/orders")
}

/// Stored file name of an order's contract.
pub fn contract_file_name(order_id: &OrderId, extension: &str) -> String {
    format!("{order_id}-contract{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str, size: usize) -> ContractDocument {
        ContractDocument::new(name, vec![b'x'; size])
    }

    #[test]
    fn accepts_allowed_types_case_insensitively() {
        assert_eq!(doc("Signed.PDF", 10).validate().unwrap(), ".pdf");
        assert_eq!(doc("scan.jpeg", 10).validate().unwrap(), ".jpeg");
        assert_eq!(doc("form.docx", 10).validate().unwrap(), ".docx");
    }

    #[test]
    fn rejects_disallowed_or_missing_extension() {
        assert!(matches!(
            doc("payload.exe", 10).validate(),
            Err(CheckoutError::InvalidDocument(_))
        ));
        assert!(matches!(
            doc("contract", 10).validate(),
            Err(CheckoutError::InvalidDocument(_))
        ));
    }

    #[test]
    fn size_ceiling_is_inclusive() {
        assert!(doc("big.pdf", MAX_CONTRACT_BYTES).validate().is_ok());
        assert!(matches!(
            doc("big.pdf", MAX_CONTRACT_BYTES + 1).validate(),
            Err(CheckoutError::InvalidDocument(_))
        ));
    }

    #[test]
    fn empty_document_counts_as_missing() {
        assert!(matches!(
            doc("empty.pdf", 0).validate(),
            Err(CheckoutError::ContractRequired)
        ));
    }

    #[test]
    fn naming_convention() {
        let customer = CustomerId::new("c0ffee");
        let order = OrderId::from_string("AB12CD34");
        assert_eq!(contract_directory(&customer), "c0ffee/orders");
        assert_eq!(contract_file_name(&order, ".pdf"), "AB12CD34-contract.pdf");
    }
}
