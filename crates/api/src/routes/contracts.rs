//! Credit contract listing, download and removal.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use checkout::ContractArchive;
use domain::{ContractSummary, CustomerId};
use serde::Serialize;

use crate::error::ApiError;
use crate::state::{AppState, SharedDocumentStore};

#[derive(Serialize)]
pub struct ContractEntry {
    #[serde(flatten)]
    pub summary: ContractSummary,
    pub download_path: String,
}

#[derive(Serialize)]
pub struct ContractFile {
    pub file_name: String,
    pub download_path: String,
}

fn download_path(customer_id: &CustomerId, file_name: &str) -> String {
    ContractArchive::<SharedDocumentStore>::download_path(customer_id, file_name)
}

/// GET /contracts — every order that carries a contract, newest first.
#[tracing::instrument(skip(state))]
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<ContractEntry>> {
    let entries = state
        .queries
        .list_contracts()
        .await
        .into_iter()
        .map(|summary| ContractEntry {
            download_path: download_path(&summary.customer_id, &summary.file_name),
            summary,
        })
        .collect();
    Json(entries)
}

/// GET /customers/{id}/contracts — contract files stored for a customer.
#[tracing::instrument(skip(state))]
pub async fn for_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<Vec<ContractFile>> {
    let customer_id = CustomerId::new(id);
    let files = state
        .contracts
        .list_customer_contracts(&customer_id)
        .await
        .into_iter()
        .map(|file_name| ContractFile {
            download_path: download_path(&customer_id, &file_name),
            file_name,
        })
        .collect();
    Json(files)
}

/// GET /customers/{id}/contracts/{file} — download one contract.
#[tracing::instrument(skip(state))]
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path((id, file_name)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let content = state
        .contracts
        .download_contract(&CustomerId::new(id), &file_name)
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type(&file_name).to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        content,
    ))
}

/// DELETE /customers/{id}/contracts/{file} — remove one contract.
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path((id, file_name)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    if state
        .contracts
        .delete_contract(&CustomerId::new(id), &file_name)
        .await
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound {
            message: format!("Contract {file_name} not found"),
            redirect: "/contracts",
        })
    }
}

fn content_type(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_types_follow_extension() {
        assert_eq!(content_type("A-contract.PDF"), "application/pdf");
        assert_eq!(content_type("A-contract.jpeg"), "image/jpeg");
        assert_eq!(content_type("noext"), "application/octet-stream");
    }
}
