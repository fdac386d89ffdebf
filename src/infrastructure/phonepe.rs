//! PhonePe standard checkout (v2) client.
//!
//! Every call authenticates with a client-credentials token that is cached
//! until shortly before it expires. Callbacks carry
//! `Authorization: hex(sha256("<username>:<password>"))`, which is compared
//! against the configured callback credentials before the body is trusted.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::config::PhonePeConfig;
use crate::domain::errors::DomainError;
use crate::domain::payment::{
    CallbackPayload, GatewayOrderStatus, GatewayState, PaymentRedirect, PaymentRequest,
};
use crate::domain::ports::PaymentGateway;

/// Seconds before expiry at which a cached token is refreshed.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_at: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePaymentResponse {
    order_id: Option<String>,
    redirect_url: String,
}

pub struct PhonePeGateway {
    config: PhonePeConfig,
    http_client: Client,
    token: Mutex<Option<CachedToken>>,
}

impl PhonePeGateway {
    pub fn new(config: PhonePeConfig) -> Result<Self, DomainError> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DomainError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            config,
            http_client,
            token: Mutex::new(None),
        })
    }

    fn cached_token(&self) -> Option<String> {
        let guard = self.token.lock().ok()?;
        guard
            .as_ref()
            .filter(|t| t.expires_at - TOKEN_REFRESH_MARGIN_SECS > Utc::now().timestamp())
            .map(|t| t.access_token.clone())
    }

    async fn access_token(&self) -> Result<String, DomainError> {
        if let Some(token) = self.cached_token() {
            return Ok(token);
        }

        let url = format!(
            "{}/v1/oauth/token",
            self.config.environment.auth_base_url()
        );
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_version", self.config.client_version.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "client_credentials"),
        ];
        let response = self.http_client.post(url).form(&params).send().await?;
        let token: TokenResponse = read_json(response, "token request").await?;

        if let Ok(mut guard) = self.token.lock() {
            *guard = Some(CachedToken {
                access_token: token.access_token.clone(),
                expires_at: token.expires_at,
            });
        }
        Ok(token.access_token)
    }

    async fn pay(&self, request: PaymentRequest) -> Result<PaymentRedirect, DomainError> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/checkout/v2/pay",
            self.config.environment.checkout_base_url()
        );
        let body = json!({
            "merchantOrderId": request.merchant_order_id,
            "amount": request.amount_minor_units,
            "paymentFlow": {
                "type": "PG_CHECKOUT",
                "merchantUrls": { "redirectUrl": request.redirect_url },
            },
        });

        let response = self
            .http_client
            .post(url)
            .header("Authorization", format!("O-Bearer {token}"))
            .json(&body)
            .send()
            .await?;
        let created: CreatePaymentResponse = read_json(response, "create payment").await?;
        log::info!(
            "PhonePe order {:?} created for {}",
            created.order_id,
            request.merchant_order_id
        );
        Ok(PaymentRedirect {
            gateway_order_id: created.order_id,
            redirect_url: created.redirect_url,
        })
    }

    async fn order_status(
        &self,
        merchant_order_id: &str,
    ) -> Result<GatewayOrderStatus, DomainError> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/checkout/v2/order/{}/status",
            self.config.environment.checkout_base_url(),
            merchant_order_id
        );
        let response = self
            .http_client
            .get(url)
            .header("Authorization", format!("O-Bearer {token}"))
            .send()
            .await?;
        let raw: Value = read_json(response, "order status").await?;
        parse_order_status(raw)
    }
}

#[async_trait]
impl PaymentGateway for PhonePeGateway {
    async fn create_payment(
        &self,
        request: PaymentRequest,
    ) -> Result<PaymentRedirect, DomainError> {
        self.pay(request).await
    }

    async fn get_order_status(
        &self,
        merchant_order_id: &str,
    ) -> Result<GatewayOrderStatus, DomainError> {
        self.order_status(merchant_order_id).await
    }

    fn validate_callback(
        &self,
        authorization: Option<&str>,
        raw_body: &[u8],
    ) -> Result<CallbackPayload, DomainError> {
        let expected = callback_authorization(
            &self.config.callback_username,
            &self.config.callback_password,
        );
        let presented = authorization
            .map(str::trim)
            .ok_or_else(|| DomainError::invalid("callback is missing the Authorization header"))?;
        if !presented.eq_ignore_ascii_case(&expected) {
            return Err(DomainError::invalid("callback authorization does not match"));
        }
        parse_callback(raw_body)
    }
}

/// Hex SHA-256 of `username:password`, as PhonePe sends it on callbacks.
pub fn callback_authorization(username: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{username}:{password}"));
    format!("{:x}", hasher.finalize())
}

fn parse_callback(raw_body: &[u8]) -> Result<CallbackPayload, DomainError> {
    let raw: Value = serde_json::from_slice(raw_body)
        .map_err(|e| DomainError::invalid(format!("callback body is not JSON: {e}")))?;
    let merchant_order_id = raw
        .pointer("/payload/merchantOrderId")
        .and_then(Value::as_str)
        .ok_or_else(|| DomainError::invalid("callback payload has no merchantOrderId"))?
        .to_string();
    Ok(CallbackPayload {
        merchant_order_id,
        raw,
    })
}

fn parse_order_status(raw: Value) -> Result<GatewayOrderStatus, DomainError> {
    let state = raw
        .get("state")
        .and_then(Value::as_str)
        .ok_or_else(|| DomainError::Upstream("order status response has no state".to_string()))?;
    let state = GatewayState::parse(state);
    if let GatewayState::Unrecognized(other) = &state {
        log::warn!("PhonePe reported unrecognized order state '{}'", other);
    }

    let gateway_order_id = raw
        .get("orderId")
        .and_then(Value::as_str)
        .map(str::to_string);
    // The latest attempt is last.
    let payment_id = raw
        .get("paymentDetails")
        .and_then(Value::as_array)
        .and_then(|attempts| attempts.last())
        .and_then(|attempt| attempt.get("transactionId"))
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(GatewayOrderStatus {
        state,
        gateway_order_id,
        payment_id,
        raw,
    })
}

async fn read_json<T>(response: reqwest::Response, what: &str) -> Result<T, DomainError>
where
    T: serde::de::DeserializeOwned,
{
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        log::error!("PhonePe {} failed with {}: {}", what, status, body);
        return Err(DomainError::Upstream(format!(
            "PhonePe {what} failed with {status}"
        )));
    }
    response
        .json()
        .await
        .map_err(|e| DomainError::Upstream(format!("PhonePe {what} returned bad JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::config::PhonePeEnvironment;

    fn gateway() -> PhonePeGateway {
        PhonePeGateway::new(PhonePeConfig {
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            client_version: "1".to_string(),
            environment: PhonePeEnvironment::Sandbox,
            callback_username: "merchant".to_string(),
            callback_password: "s3cret".to_string(),
            timeout: Duration::from_secs(5),
        })
        .expect("client builds")
    }

    fn callback_body() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "type": "CHECKOUT_ORDER_COMPLETED",
            "payload": {
                "merchantOrderId": "4f1c2d",
                "orderId": "OMO123",
                "state": "COMPLETED"
            }
        }))
        .unwrap()
    }

    #[test]
    fn callback_authorization_is_hex_sha256() {
        assert_eq!(
            callback_authorization("user", "pass"),
            "ef4c914c591698b268db3c64163eafda7209a630f236ebf0eebf045460df723a"
        );
    }

    #[test]
    fn valid_callback_yields_merchant_order_id() {
        let gw = gateway();
        let auth = callback_authorization("merchant", "s3cret");
        let payload = gw
            .validate_callback(Some(&auth), &callback_body())
            .expect("callback should validate");
        assert_eq!(payload.merchant_order_id, "4f1c2d");
        assert_eq!(payload.raw["payload"]["state"], "COMPLETED");
    }

    #[test]
    fn callback_with_wrong_credentials_is_rejected() {
        let gw = gateway();
        let auth = callback_authorization("merchant", "guess");
        let err = gw
            .validate_callback(Some(&auth), &callback_body())
            .expect_err("must reject");
        assert!(matches!(err, DomainError::InvalidInput(_)));

        let err = gw
            .validate_callback(None, &callback_body())
            .expect_err("must reject");
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn callback_without_merchant_order_id_is_rejected() {
        let gw = gateway();
        let auth = callback_authorization("merchant", "s3cret");
        let err = gw
            .validate_callback(Some(&auth), br#"{"payload":{"state":"COMPLETED"}}"#)
            .expect_err("must reject");
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn order_status_takes_latest_payment_attempt() {
        let status = parse_order_status(json!({
            "orderId": "OMO123",
            "state": "COMPLETED",
            "paymentDetails": [
                { "transactionId": "OM1", "state": "FAILED" },
                { "transactionId": "OM2", "state": "COMPLETED" }
            ]
        }))
        .expect("parses");
        assert_eq!(status.state, GatewayState::Completed);
        assert_eq!(status.gateway_order_id.as_deref(), Some("OMO123"));
        assert_eq!(status.payment_id.as_deref(), Some("OM2"));
    }

    #[test]
    fn order_status_without_state_is_upstream_error() {
        let err = parse_order_status(json!({ "orderId": "OMO123" })).expect_err("must fail");
        assert!(matches!(err, DomainError::Upstream(_)));
    }
}
