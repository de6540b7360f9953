use async_trait::async_trait;
use chrono::Utc;
use perk_core::{Coins, WalletAddress};
use serde::{Deserialize, Serialize};

use crate::error::TransferError;
use crate::traits::ITokenRail;
use crate::types::{TransferId, TransferReceipt};

/// HTTP relayer rail.
///
/// Delegates signing and on-chain submission to an external relayer service
/// holding the treasury key. The relayer accepts
/// `POST <endpoint> { "to": <wallet>, "value": <base units> }` and responds
/// with `{ "txHash": "0x…" }` once the transaction is confirmed.
pub struct RelayerRail {
    client: reqwest::Client,
    endpoint: String,
    bearer_token: Option<String>,
    token_decimals: u32,
}

#[derive(Serialize)]
struct RelayerRequest<'a> {
    to: &'a str,
    /// Base units as a decimal string — values overflow JSON numbers.
    value: String,
}

#[derive(Deserialize)]
struct RelayerResponse {
    #[serde(rename = "txHash")]
    tx_hash: String,
}

/// Reward units scaled to the token's base units.
fn to_base_units(amount: Coins, decimals: u32) -> u128 {
    (amount as u128) * 10u128.pow(decimals)
}

impl RelayerRail {
    pub fn new(endpoint: String, bearer_token: Option<String>, token_decimals: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            bearer_token,
            token_decimals,
        }
    }
}

#[async_trait]
impl ITokenRail for RelayerRail {
    async fn transfer(
        &self,
        recipient: &WalletAddress,
        amount: Coins,
    ) -> Result<TransferReceipt, TransferError> {
        let transfer_id = TransferId::new();
        let body = RelayerRequest {
            to: recipient.as_str(),
            value: to_base_units(amount, self.token_decimals).to_string(),
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(ref token) = self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(TransferError::Rejected(format!(
                "relayer returned {}: {}",
                status, detail
            )));
        }

        let parsed: RelayerResponse = response
            .json()
            .await
            .map_err(|e| TransferError::MalformedResponse(e.to_string()))?;
        if !parsed.tx_hash.starts_with("0x") {
            return Err(TransferError::MalformedResponse(format!(
                "txHash is not hex-prefixed: {}",
                parsed.tx_hash
            )));
        }

        tracing::info!(
            transfer_id = %transfer_id,
            wallet = %recipient,
            amount,
            tx_hash = %parsed.tx_hash,
            "relayer transfer confirmed"
        );

        Ok(TransferReceipt {
            transfer_id,
            rail_id: self.rail_id().to_string(),
            recipient: recipient.clone(),
            amount,
            tx_hash: parsed.tx_hash,
            confirmed_at: Utc::now(),
        })
    }

    fn rail_id(&self) -> &str {
        "rail-relayer"
    }
}
