//! Payment gateway collaborator.
//!
//! A gateway accepts a payment request and answers synchronously with an id it will
//! later quote in an asynchronous callback. The callback wire format is the M-Pesa
//! STK push result (`Body.stkCallback`), which [`StkCallbackEnvelope`] deserializes and
//! converts into the gateway-neutral [`PaymentCallback`].

use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Metadata item carrying the gateway receipt number on success.
pub const RECEIPT_NUMBER_ITEM: &str = "MpesaReceiptNumber";

/// Request to collect `amount` from `phone_number`.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentRequest {
    /// Payer phone number, e.g. `254712345678`
    pub phone_number: String,
    /// Amount to collect
    pub amount: f64,
    /// Merchant reference shown to the payer, e.g. `DONATION_12`
    pub reference: String,
    /// Human-readable description
    pub description: String,
}

/// Synchronous answer to [`PaymentGateway::initiate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayResponse {
    /// Whether the gateway accepted the request
    pub success: bool,
    /// Id the gateway will quote in its callback
    pub checkout_request_id: Option<String>,
    /// Gateway message, for logs and callers
    pub message: String,
}

/// A mobile-money provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Payment method name stored on payments created through this gateway.
    fn method(&self) -> &'static str {
        "mpesa"
    }

    /// Starts a payment. Transport failures are errors; refusals are `success: false`.
    async fn initiate(&self, request: &PaymentRequest) -> Result<GatewayResponse>;
}

/// Gateway stand-in that answers immediately without contacting a provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedGateway {
    decline: bool,
}

impl SimulatedGateway {
    /// A gateway that accepts every request.
    #[must_use]
    pub const fn accepting() -> Self {
        Self { decline: false }
    }

    /// A gateway that refuses every request.
    #[must_use]
    pub const fn declining() -> Self {
        Self { decline: true }
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn initiate(&self, request: &PaymentRequest) -> Result<GatewayResponse> {
        if self.decline {
            return Ok(GatewayResponse {
                success: false,
                checkout_request_id: None,
                message: "Request declined by simulated gateway".to_string(),
            });
        }

        let checkout_request_id = format!("ws_CO_{}", uuid::Uuid::new_v4().simple());
        info!(
            reference = %request.reference,
            amount = request.amount,
            "Simulated STK push issued {}",
            checkout_request_id
        );
        Ok(GatewayResponse {
            success: true,
            checkout_request_id: Some(checkout_request_id),
            message: "STK push initiated successfully".to_string(),
        })
    }
}

/// Gateway-neutral payment result.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentCallback {
    /// Id issued at initiation
    pub transaction_id: String,
    /// `0` means success
    pub result_code: i64,
    /// Gateway's description of the result
    pub result_desc: String,
    /// Extra name/value pairs (receipt number, amount, phone, ...)
    pub metadata: Vec<CallbackItem>,
}

impl PaymentCallback {
    /// Whether the gateway reports the payment as collected.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result_code == 0
    }

    /// The canonical receipt number, when the gateway sent one.
    #[must_use]
    pub fn receipt_number(&self) -> Option<String> {
        self.metadata
            .iter()
            .find(|item| item.name == RECEIPT_NUMBER_ITEM)
            .and_then(|item| match &item.value {
                Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            })
    }
}

/// One `CallbackMetadata.Item` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CallbackItem {
    /// Item name
    #[serde(rename = "Name")]
    pub name: String,
    /// Item value; absent for some items
    #[serde(rename = "Value", default)]
    pub value: Option<Value>,
}

/// Top level of the STK push callback body.
#[derive(Debug, Deserialize)]
pub struct StkCallbackEnvelope {
    /// `Body`
    #[serde(rename = "Body")]
    pub body: StkCallbackBody,
}

/// `Body` of the STK push callback.
#[derive(Debug, Deserialize)]
pub struct StkCallbackBody {
    /// `stkCallback`
    #[serde(rename = "stkCallback")]
    pub stk_callback: StkCallback,
}

/// The STK push result.
#[derive(Debug, Deserialize)]
pub struct StkCallback {
    /// Merchant-side request id
    #[serde(rename = "MerchantRequestID", default)]
    pub merchant_request_id: Option<String>,
    /// Id returned when the push was initiated
    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: String,
    /// `0` on success
    #[serde(rename = "ResultCode")]
    pub result_code: i64,
    /// Result description
    #[serde(rename = "ResultDesc", default)]
    pub result_desc: String,
    /// Present on success only
    #[serde(rename = "CallbackMetadata", default)]
    pub callback_metadata: Option<CallbackMetadata>,
}

/// `CallbackMetadata` wrapper.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackMetadata {
    /// Metadata items
    #[serde(rename = "Item", default)]
    pub item: Vec<CallbackItem>,
}

impl From<StkCallbackEnvelope> for PaymentCallback {
    fn from(envelope: StkCallbackEnvelope) -> Self {
        let callback = envelope.body.stk_callback;
        Self {
            transaction_id: callback.checkout_request_id,
            result_code: callback.result_code,
            result_desc: callback.result_desc,
            metadata: callback
                .callback_metadata
                .map(|metadata| metadata.item)
                .unwrap_or_default(),
        }
    }
}
