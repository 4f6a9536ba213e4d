//! Direct messages sent as a side effect of payment and premium commands.
//!
//! A failed notification never fails the command that triggered it.

use crate::{
    core::platform::ChatPlatform,
    entities::payment,
};
use chrono::{DateTime, Utc};
use tracing::error;

/// Tells the admin a payment claim is waiting. Returns whether the message went out.
pub async fn notify_admin_of_payment<P>(
    platform: &P,
    admin_id: i64,
    payment: &payment::Model,
    username: &str,
) -> bool
where
    P: ChatPlatform,
{
    let text = format!(
        "🔔 Payment Request\n\
        User: {username} ({user_id})\n\
        Amount: ₹{amount}\n\
        Txn: {txn}\n\
        Payment ID: {payment_id}\n\n\
        Approve: /approve {user_id} 30\n\
        Reject: /reject {payment_id}",
        user_id = payment.user_id,
        amount = payment.amount,
        txn = payment.txn_id,
        payment_id = payment.id,
    );

    match platform.notify(admin_id, &text).await {
        Ok(()) => true,
        Err(e) => {
            error!(admin_id, payment_id = payment.id, error = %e, "Admin notify failed");
            false
        }
    }
}

/// Tells a user their premium is active. Returns whether the message went out.
pub async fn notify_premium_granted<P>(
    platform: &P,
    user_id: i64,
    days: i64,
    until: DateTime<Utc>,
) -> bool
where
    P: ChatPlatform,
{
    let text = format!(
        "🎉 Premium activated for {days} days!\nValid until: {}",
        until.format("%Y-%m-%d %H:%M UTC")
    );

    match platform.notify(user_id, &text).await {
        Ok(()) => true,
        Err(e) => {
            error!(user_id, error = %e, "Premium notify failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        entities::PaymentStatus,
        errors::{Error, Result},
        test_utils::RecordingPlatform,
    };
    use chrono::TimeZone;

    struct OfflinePlatform;

    impl ChatPlatform for OfflinePlatform {
        async fn copy(
            &self,
            _destination: &crate::core::platform::ChatId,
            _source: &crate::core::platform::ChatId,
            _message_id: u64,
        ) -> Result<()> {
            Err(Error::Unauthorized)
        }

        async fn notify(&self, _user_id: i64, _text: &str) -> Result<()> {
            Err(Error::Unauthorized)
        }
    }

    fn sample_payment() -> payment::Model {
        payment::Model {
            id: 12,
            user_id: 345,
            amount: 150,
            txn_id: "UPI-778".to_string(),
            status: PaymentStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_admin_notification_mentions_payment() {
        let platform = RecordingPlatform::default();

        assert!(notify_admin_of_payment(&platform, 1, &sample_payment(), "bob").await);

        let sent = platform.notifications();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, 1);
        assert!(sent[0].1.contains("bob (345)"));
        assert!(sent[0].1.contains("/approve 345 30"));
        assert!(sent[0].1.contains("/reject 12"));
    }

    #[tokio::test]
    async fn test_premium_notification_goes_to_user() {
        let platform = RecordingPlatform::default();
        let until = Utc.with_ymd_and_hms(2027, 1, 2, 3, 4, 0).unwrap();

        assert!(notify_premium_granted(&platform, 345, 30, until).await);

        let sent = platform.notifications();
        assert_eq!(sent[0].0, 345);
        assert!(sent[0].1.contains("30 days"));
        assert!(sent[0].1.contains("2027-01-02 03:04 UTC"));
    }

    #[tokio::test]
    async fn test_notification_failure_is_swallowed() {
        assert!(!notify_admin_of_payment(&OfflinePlatform, 1, &sample_payment(), "bob").await);
        assert!(!notify_premium_granted(&OfflinePlatform, 1, 30, Utc::now()).await);
    }
}
