use serde::Deserialize;
use strum_macros::{Display, EnumString};

/// Events the payment provider posts to the webhook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum WebhookEvent {
    #[strum(serialize = "user.upgraded")]
    UserUpgraded,
}

#[derive(Debug, Deserialize)]
pub struct WebhookData {
    pub user_id: String,
}

/// Request body for POST /api/polka/webhooks
#[derive(Debug, Deserialize)]
pub struct WebhookRequest {
    pub event: String,
    pub data: WebhookData,
}

impl WebhookRequest {
    /// None for events this service does not act on
    pub fn known_event(&self) -> Option<WebhookEvent> {
        self.event.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_event() {
        let request: WebhookRequest = serde_json::from_str(
            r#"{"event": "user.upgraded", "data": {"user_id": "3311741c-680c-4546-99f3-fc9efac2036c"}}"#,
        )
        .unwrap();
        assert_eq!(request.known_event(), Some(WebhookEvent::UserUpgraded));
        assert_eq!(WebhookEvent::UserUpgraded.to_string(), "user.upgraded");
    }

    #[test]
    fn test_unknown_event() {
        let request: WebhookRequest =
            serde_json::from_str(r#"{"event": "user.payment_failed", "data": {"user_id": ""}}"#)
                .unwrap();
        assert_eq!(request.known_event(), None);
    }
}
