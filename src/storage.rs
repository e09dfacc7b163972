//! Object-store collaborator: moves finished artifacts to and from an
//! S3-style HTTP endpoint, keyed by the trade id. Outside the layout core;
//! callers decide whether a failed transfer is retried.

use log::info;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

const ENDPOINT_VAR: &str = "CONTRACT_STORE_ENDPOINT";
const BUCKET_VAR: &str = "CONTRACT_STORE_BUCKET";
const DEFAULT_BUCKET: &str = "my-bucket";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("environment variable {0} is not set")]
    Env(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct ContractStore {
    client: Client,
    endpoint: String,
    bucket: String,
}

impl ContractStore {
    pub fn new(endpoint: String, bucket: String) -> ContractStore {
        ContractStore {
            client: Client::new(),
            endpoint,
            bucket,
        }
    }

    pub fn from_env() -> Result<ContractStore, StorageError> {
        let endpoint =
            env::var(ENDPOINT_VAR).map_err(|_| StorageError::Env(ENDPOINT_VAR.to_string()))?;
        let bucket = env::var(BUCKET_VAR).unwrap_or_else(|_| DEFAULT_BUCKET.to_string());
        Ok(ContractStore::new(endpoint, bucket))
    }

    fn object_url(&self, key: Uuid) -> String {
        format!("{}/{}/{}", self.endpoint.trim_end_matches('/'), self.bucket, key)
    }

    pub fn upload(&self, path: &Path, key: Uuid) -> Result<(), StorageError> {
        let bytes = fs::read(path)?;
        info!(
            "uploading {} ({} bytes) as {}",
            path.display(),
            bytes.len(),
            key
        );
        let response = self
            .client
            .put(self.object_url(key))
            .header(CONTENT_TYPE, "application/pdf")
            .body(bytes)
            .send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StorageError::UnexpectedStatus { status, body });
        }
        Ok(())
    }

    pub fn download(&self, key: Uuid) -> Result<Vec<u8>, StorageError> {
        let response = self.client.get(self.object_url(key)).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StorageError::UnexpectedStatus { status, body });
        }
        Ok(response.bytes()?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_url_joins_endpoint_bucket_and_key() {
        let store = ContractStore::new(
            "https://store.example.com/".to_string(),
            "my-bucket".to_string(),
        );
        let key = Uuid::nil();
        assert_eq!(
            store.object_url(key),
            "https://store.example.com/my-bucket/00000000-0000-0000-0000-000000000000"
        );
    }
}
