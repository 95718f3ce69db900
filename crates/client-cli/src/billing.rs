//! Balance top-ups: promo code redemption and paid plan checkout.
//!
//! Neither path computes a balance locally; after the server confirms, the
//! session is re-verified and the new numbers come from there.

use std::sync::Arc;

use shared::{
    actions, codes, ActivatePromoRequest, ActivatePromoResponse, CaptureOrderRequest,
    CaptureOrderResponse, CreateOrderRequest, CreateOrderResponse, PaidPlan,
};

use crate::auth::session_failure;
use crate::error::{ClientError, ClientResult, ValidationError};
use crate::gateway::{Gateway, GatewayError, Request, Service};
use crate::session::SessionStore;

/// Trimmed and upper-cased, the way codes are stored server-side
pub fn normalize_promo_code(code: &str) -> Result<String, ValidationError> {
    let code = code.trim().to_uppercase();
    if code.is_empty() {
        Err(ValidationError::MissingField("Promo code"))
    } else {
        Ok(code)
    }
}

#[derive(Clone)]
pub struct BillingClient {
    gateway: Arc<dyn Gateway>,
}

impl BillingClient {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    pub async fn redeem_promo(&self, store: &SessionStore, code: &str) -> ClientResult<ActivatePromoResponse> {
        let code = normalize_promo_code(code)?;
        let session = store.ensure_verified().await?;

        let request = Request::post(Service::Admin)
            .action(actions::ACTIVATE_PROMO)
            .token(&session.token)
            .json(&ActivatePromoRequest { code })?;
        let resp: ActivatePromoResponse = match self.gateway.call(request).await {
            Ok(reply) => reply.decode()?,
            Err(err) => return Err(self.fail(store, promo_failure(err)).await),
        };

        tracing::info!(generations = resp.generations_added, "promo code redeemed");
        refresh_after_payment(store).await;
        Ok(resp)
    }

    pub async fn create_order(&self, store: &SessionStore, plan: PaidPlan) -> ClientResult<CreateOrderResponse> {
        let session = store.ensure_verified().await?;
        let request = Request::post(Service::Payment)
            .action(actions::CREATE_ORDER)
            .token(&session.token)
            .json(&CreateOrderRequest { plan })?;
        match self.gateway.call(request).await {
            Ok(reply) => {
                let resp: CreateOrderResponse = reply.decode()?;
                tracing::info!(order_id = %resp.order_id, plan = plan.id(), "order created");
                Ok(resp)
            }
            Err(err) => Err(self.fail(store, session_failure(err)).await),
        }
    }

    /// Finish an approved order; the credits are granted server-side
    pub async fn capture_order(&self, store: &SessionStore, order_id: &str) -> ClientResult<CaptureOrderResponse> {
        let order_id = order_id.trim();
        if order_id.is_empty() {
            return Err(ValidationError::MissingField("Order ID").into());
        }
        let session = store.ensure_verified().await?;
        let request = Request::post(Service::Payment)
            .action(actions::CAPTURE_ORDER)
            .token(&session.token)
            .json(&CaptureOrderRequest {
                order_id: order_id.to_string(),
            })?;
        let resp: CaptureOrderResponse = match self.gateway.call(request).await {
            Ok(reply) => reply.decode()?,
            Err(err) => return Err(self.fail(store, session_failure(err)).await),
        };

        tracing::info!(order_id = %resp.order_id, credits = resp.credits_added, "payment captured");
        refresh_after_payment(store).await;
        Ok(resp)
    }

    async fn fail(&self, store: &SessionStore, err: ClientError) -> ClientError {
        if err.invalidates_session() {
            store.invalidate().await;
        }
        err
    }
}

async fn refresh_after_payment(store: &SessionStore) {
    if let Err(e) = store.refresh().await {
        tracing::warn!("balance refresh failed: {}", e);
    }
}

fn promo_failure(err: GatewayError) -> ClientError {
    let Some((status, failure)) = err.rejection() else {
        return err.into();
    };
    let message = match failure.code() {
        Some(codes::PROMO_CODE_REQUIRED) => "Enter a promo code",
        Some(codes::PROMO_NOT_FOUND) => "Promo code not found",
        Some(codes::PROMO_INACTIVE) => "Promo code is no longer active",
        Some(codes::PROMO_EXHAUSTED) => "Promo code has been fully redeemed",
        Some(codes::PROMO_ALREADY_USED) => "You have already used this promo code",
        _ => return session_failure(err),
    };
    ClientError::server(Some(status), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthClient;
    use crate::gateway::fake::FakeGateway;
    use crate::session::MemoryStorage;
    use serde_json::json;
    use std::time::Duration;

    async fn signed_in(gateway: Arc<FakeGateway>) -> SessionStore {
        gateway.ok(
            Service::Auth,
            Some(actions::LOGIN),
            json!({"session_token": "tok", "user": {"id": 1, "email": "ann@example.com", "credits": 0}}),
        );
        let store = SessionStore::new(
            AuthClient::new(gateway),
            Arc::new(MemoryStorage::new()),
            Duration::from_secs(1),
        );
        store.login("ann@example.com", "longenough").await.unwrap();
        store
    }

    #[test]
    fn test_promo_code_normalisation() {
        assert_eq!(normalize_promo_code("  ab12cd ").unwrap(), "AB12CD");
        assert_eq!(
            normalize_promo_code("   "),
            Err(ValidationError::MissingField("Promo code"))
        );
    }

    #[tokio::test]
    async fn test_redeem_refreshes_balance_from_server() {
        let gateway = Arc::new(FakeGateway::new());
        let store = signed_in(gateway.clone()).await;
        gateway
            .ok(Service::Admin, Some(actions::ACTIVATE_PROMO), json!({"generations_added": 15}))
            .ok(
                Service::Auth,
                Some(actions::VERIFY),
                json!({"user": {"id": 1, "email": "ann@example.com", "credits": 15}}),
            );
        let billing = BillingClient::new(gateway.clone());

        let resp = billing.redeem_promo(&store, " welcome15 ").await.unwrap();
        assert_eq!(resp.generations_added, 15);
        assert_eq!(store.snapshot().user().unwrap().credits, 15);

        let activate = gateway
            .calls()
            .into_iter()
            .find(|c| c.action == Some(actions::ACTIVATE_PROMO))
            .unwrap();
        assert_eq!(activate.body.unwrap()["code"], "WELCOME15");
    }

    #[tokio::test]
    async fn test_promo_failures_have_distinct_messages() {
        let gateway = Arc::new(FakeGateway::new());
        let store = signed_in(gateway.clone()).await;
        for (status, code) in [(404, "PROMO_NOT_FOUND"), (403, "PROMO_INACTIVE"), (403, "PROMO_ALREADY_USED")] {
            gateway.fail(Service::Admin, Some(actions::ACTIVATE_PROMO), status, json!({"error": code}));
        }
        let billing = BillingClient::new(gateway);

        let mut messages = Vec::new();
        for _ in 0..3 {
            let err = billing.redeem_promo(&store, "CODE").await.unwrap_err();
            assert!(matches!(err, ClientError::Server { .. }));
            messages.push(err.to_string());
        }
        messages.dedup();
        assert_eq!(messages.len(), 3);
        assert!(store.snapshot().is_signed_in());
    }

    #[tokio::test]
    async fn test_create_order_requires_session() {
        let gateway = Arc::new(FakeGateway::new());
        let store = SessionStore::new(
            AuthClient::new(gateway.clone()),
            Arc::new(MemoryStorage::new()),
            Duration::from_secs(1),
        );
        let billing = BillingClient::new(gateway.clone());
        assert!(billing.create_order(&store, PaidPlan::Starter).await.is_err());
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_and_capture_order() {
        let gateway = Arc::new(FakeGateway::new());
        let store = signed_in(gateway.clone()).await;
        gateway
            .ok(
                Service::Payment,
                Some(actions::CREATE_ORDER),
                json!({"order_id": "5O190127TN364715T", "approve_link": "https://paypal.example/approve", "amount": "10.00"}),
            )
            .ok(
                Service::Payment,
                Some(actions::CAPTURE_ORDER),
                json!({"order_id": "5O190127TN364715T", "status": "completed", "credits_added": 100}),
            )
            .ok(
                Service::Auth,
                Some(actions::VERIFY),
                json!({"user": {"id": 1, "email": "ann@example.com", "credits": 100, "subscription_status": "active"}}),
            );
        let billing = BillingClient::new(gateway.clone());

        let order = billing.create_order(&store, PaidPlan::Standard).await.unwrap();
        assert_eq!(order.approve_link.as_deref(), Some("https://paypal.example/approve"));
        let create = gateway
            .calls()
            .into_iter()
            .find(|c| c.action == Some(actions::CREATE_ORDER))
            .unwrap();
        assert_eq!(create.body.unwrap()["plan"], "standard");

        let captured = billing.capture_order(&store, &order.order_id).await.unwrap();
        assert_eq!(captured.credits_added, 100);
        assert_eq!(store.snapshot().user().unwrap().credits, 100);
    }
}
