//! Infrastructure implementation of the `LedgerClient` port.
//!
//! `HttpLedgerClient` talks JSON-RPC to a local development ledger node.
//! All transport and protocol failures are folded into the opaque
//! [`LedgerError`] the deployment core expects.

use serde::Deserialize;
use serde_json::{Value, json};

use crate::application::ports::{LedgerClient, ResourceParams};
use crate::domain::{LedgerError, TxEntry};

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// JSON-RPC ledger client over HTTP.
pub struct HttpLedgerClient {
    http: reqwest::Client,
    provider_uri: String,
}

impl HttpLedgerClient {
    #[must_use]
    pub fn new(provider_uri: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            provider_uri: provider_uri.to_string(),
        }
    }

    async fn rpc(&self, method: &str, params: Value) -> Result<Value, LedgerError> {
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1,
        });
        let response = self
            .http
            .post(&self.provider_uri)
            .json(&body)
            .send()
            .await
            .map_err(|e| LedgerError(format!("{method}: {e}")))?;
        let response: RpcResponse = response
            .json()
            .await
            .map_err(|e| LedgerError(format!("{method}: malformed response: {e}")))?;
        if let Some(err) = response.error {
            return Err(LedgerError(format!(
                "{method}: rpc error {}: {}",
                err.code, err.message
            )));
        }
        response
            .result
            .ok_or_else(|| LedgerError(format!("{method}: empty result")))
    }
}

impl LedgerClient for HttpLedgerClient {
    async fn create_resource(
        &self,
        unit: &str,
        deployer_address: &str,
        params: &ResourceParams,
    ) -> Result<Vec<TxEntry>, LedgerError> {
        let request = json!({
            "unit": unit,
            "deployer": deployer_address,
            "upgradeable": params.upgradeable,
            "secret": params.secret.as_deref().map(hex::encode),
            "dependency_agent": params.dependency_agent,
        });
        let result = self.rpc("apiary_createResource", json!([request])).await?;
        let transactions: Vec<TxEntry> = serde_json::from_value(result)
            .map_err(|e| LedgerError(format!("create_resource for '{unit}': {e}")))?;
        Ok(transactions)
    }

    async fn accounts(&self) -> Result<Vec<String>, LedgerError> {
        let result = self.rpc("eth_accounts", json!([])).await?;
        let accounts: Vec<String> = serde_json::from_value(result)
            .map_err(|e| LedgerError(format!("accounts: {e}")))?;
        Ok(accounts)
    }
}
