//! Posting transaction bundles to a FHIR server

use octofhir_valueset_diagnostics::ValueSetError;
use octofhir_valueset_model::{Encoding, TransactionBundle};

/// Minimal client for the transaction endpoint (`POST [base]`)
pub struct FhirClient {
    http: reqwest::Client,
    endpoint: String,
    encoding: Encoding,
}

impl FhirClient {
    pub fn new(endpoint: &str, encoding: Encoding) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            encoding,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Post one transaction bundle
    pub async fn post_transaction(&self, bundle: &TransactionBundle) -> Result<(), ValueSetError> {
        let resource = serde_json::to_value(bundle)?;
        let body = self.encoding.serializer().serialize(&resource)?;

        let resp = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", self.encoding.content_type())
            .header("Accept", self.encoding.content_type())
            .body(body)
            .send()
            .await
            .map_err(|e| ValueSetError::transport(&self.endpoint, e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ValueSetError::transport(
                &self.endpoint,
                format!("bundle {} rejected (HTTP {status}): {body}", bundle.id),
            ));
        }
        tracing::info!(bundle = %bundle.id, entries = bundle.len(), %status, "posted bundle");
        Ok(())
    }

    /// Post bundles one after another, stopping at the first failure.
    ///
    /// Returns how many were posted.
    pub async fn post_all(&self, bundles: &[TransactionBundle]) -> Result<usize, ValueSetError> {
        for (posted, bundle) in bundles.iter().enumerate() {
            if let Err(error) = self.post_transaction(bundle).await {
                tracing::error!(
                    endpoint = %self.endpoint,
                    posted,
                    remaining = bundles.len() - posted,
                    "aborting bundle post"
                );
                return Err(error);
            }
        }
        Ok(bundles.len())
    }
}
