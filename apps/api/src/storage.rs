//! Object storage for completion-proof files.
//!
//! `AppState` holds an `Arc<dyn ProofStore>`: `S3ProofStore` in production
//! (MinIO locally, AWS in deployment), an in-memory store in tests.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

/// Content types accepted as completion proof.
pub const ALLOWED_PROOF_TYPES: &[&str] = &["application/pdf", "image/png", "image/jpeg"];

#[async_trait]
pub trait ProofStore: Send + Sync {
    /// Stores `body` under `key` and returns the URL the proof is reachable at.
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<String, AppError>;
}

pub struct S3ProofStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    endpoint: String,
}

impl S3ProofStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String, endpoint: String) -> Self {
        Self {
            client,
            bucket,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ProofStore for S3ProofStore {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<String, AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

        info!("Uploaded proof to s3://{}/{}", self.bucket, key);
        Ok(format!("{}/{}/{}", self.endpoint, self.bucket, key))
    }
}

/// Builds the object key for a proof file: `proofs/<employee>/<course>/<random>-<name>`.
pub fn proof_object_key(employee_id: Uuid, course_id: Uuid, file_name: &str) -> String {
    format!(
        "proofs/{employee_id}/{course_id}/{}-{}",
        Uuid::new_v4(),
        sanitize_file_name(file_name)
    )
}

/// Keeps ASCII alphanumerics, `.`, `-` and `_`; everything else becomes `_`.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "proof".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
pub mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// Keeps uploaded proofs in a map; used by router tests.
    #[derive(Default)]
    pub struct MemoryProofStore {
        pub objects: Mutex<HashMap<String, (Bytes, String)>>,
    }

    #[async_trait]
    impl ProofStore for MemoryProofStore {
        async fn put(
            &self,
            key: &str,
            body: Bytes,
            content_type: &str,
        ) -> Result<String, AppError> {
            self.objects
                .lock()
                .unwrap()
                .insert(key.to_string(), (body, content_type.to_string()));
            Ok(format!("memory://{key}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryProofStore;
    use super::*;

    #[test]
    fn test_sanitize_strips_paths_and_symbols() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\Users\\me\\cert final.pdf"), "cert_final.pdf");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
        assert_eq!(sanitize_file_name(""), "proof");
    }

    #[test]
    fn test_object_key_layout() {
        let employee = Uuid::new_v4();
        let course = Uuid::new_v4();
        let key = proof_object_key(employee, course, "certificate.pdf");
        assert!(key.starts_with(&format!("proofs/{employee}/{course}/")));
        assert!(key.ends_with("-certificate.pdf"));
    }

    #[tokio::test]
    async fn test_memory_store_returns_url() {
        let store = MemoryProofStore::default();
        let url = store
            .put("proofs/a.pdf", Bytes::from_static(b"%PDF"), "application/pdf")
            .await
            .unwrap();
        assert_eq!(url, "memory://proofs/a.pdf");
        assert_eq!(store.objects.lock().unwrap().len(), 1);
    }
}
