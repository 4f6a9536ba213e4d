//! Premium Discord commands - plans, payment submission and admin review.
//!
//! Payment proof is whatever transaction id the user types; the admin checks it out of band
//! and approves or rejects.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, commands::utils, notifications},
        core::{payment, user},
        errors::{Error, Result},
    };
    use chrono::Utc;
    use std::fmt::Write;

    /// Number of claims shown by `/payments` before the list is cut short.
    const MAX_LISTED: usize = 25;

    /// Shows the premium plans and how to pay.
    #[poise::command(slash_command)]
    pub async fn upgrade(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        utils::register_caller(ctx).await?;
        let data = ctx.data();

        let Some(upi_id) = data.settings.upi_id.as_deref() else {
            ctx.say("⚠️ Payments are not configured by the admin yet.")
                .await?;
            return Ok(());
        };

        let mut text = String::from("💎 **Upgrade Plans**\n");
        for plan in &data.plans.plans {
            writeln!(text, "• ₹{} — {} ({} days)", plan.amount, plan.label, plan.days)?;
        }
        write!(
            text,
            "\nPay to UPI: `{upi_id}`\nThen send: `/pay <amount> <txn_id>`"
        )?;

        ctx.say(text).await?;
        Ok(())
    }

    /// Submits a payment for the admin to verify.
    #[poise::command(slash_command)]
    pub async fn pay(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Amount paid"] amount: i64,
        #[description = "Transaction ID from your payment app"] txn_id: String,
    ) -> Result<()> {
        let user_id = utils::register_caller(ctx).await?;
        let data = ctx.data();

        let created = match payment::create_payment(&data.database, user_id, amount, &txn_id).await
        {
            Ok(created) => created,
            Err(Error::InvalidAmount { .. }) => {
                ctx.say("❌ Amount must be a positive number. Example: `/pay 150 ABC123`")
                    .await?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        notifications::notify_admin_of_payment(
            &**data.dispatcher.platform(),
            data.settings.admin_id,
            &created,
            &ctx.author().name,
        )
        .await;

        ctx.say("✅ Payment submitted. The admin will verify it and upgrade you soon.")
            .await?;
        Ok(())
    }

    /// Admin: grants premium days to a user.
    #[poise::command(slash_command)]
    pub async fn approve(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "User ID to upgrade"] user_id: String,
        #[description = "Days of premium to add"] days: i64,
    ) -> Result<()> {
        let caller = utils::register_caller(ctx).await?;
        utils::require_admin(&ctx.data().settings, caller)?;
        let user_id = utils::parse_user_id(&user_id)?;
        let data = ctx.data();

        // The user may never have talked to the bot
        user::ensure_user(&data.database, user_id, None).await?;
        let until = payment::approve_premium(&data.database, user_id, days, Utc::now()).await?;

        notifications::notify_premium_granted(
            &**data.dispatcher.platform(),
            user_id,
            days,
            until,
        )
        .await;

        ctx.say(format!(
            "✅ Approved user {user_id} until {}",
            until.format("%Y-%m-%d %H:%M UTC")
        ))
        .await?;
        Ok(())
    }

    /// Admin: lists payment claims waiting for review.
    #[poise::command(slash_command)]
    pub async fn payments(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let caller = utils::register_caller(ctx).await?;
        utils::require_admin(&ctx.data().settings, caller)?;

        let pending = payment::list_pending_payments(&ctx.data().database).await?;
        if pending.is_empty() {
            ctx.say("ℹ️ No pending payments.").await?;
            return Ok(());
        }

        let mut text = String::from("🧾 **Pending Payments**\n");
        for claim in pending.iter().take(MAX_LISTED) {
            writeln!(
                text,
                "#{} — user {} — ₹{} — `{}` — {}",
                claim.id,
                claim.user_id,
                claim.amount,
                claim.txn_id,
                claim.created_at.format("%Y-%m-%d %H:%M UTC")
            )?;
        }
        if pending.len() > MAX_LISTED {
            write!(text, "…and {} more", pending.len() - MAX_LISTED)?;
        }

        ctx.say(text).await?;
        Ok(())
    }

    /// Admin: rejects a payment claim.
    #[poise::command(slash_command)]
    pub async fn reject(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Payment ID from the request"] payment_id: i64,
    ) -> Result<()> {
        let caller = utils::register_caller(ctx).await?;
        utils::require_admin(&ctx.data().settings, caller)?;

        if payment::reject_payment(&ctx.data().database, payment_id).await? {
            ctx.say(format!("❌ Payment {payment_id} rejected.")).await?;
        } else {
            ctx.say(format!("ℹ️ Payment {payment_id} was already reviewed."))
                .await?;
        }
        Ok(())
    }

    /// Admin: removes a user's premium immediately.
    #[poise::command(slash_command)]
    pub async fn revoke(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "User ID to downgrade"] user_id: String,
    ) -> Result<()> {
        let caller = utils::register_caller(ctx).await?;
        utils::require_admin(&ctx.data().settings, caller)?;
        let user_id = utils::parse_user_id(&user_id)?;

        if !user::revoke_premium(&ctx.data().database, user_id).await? {
            return Err(Error::UserNotFound { user_id });
        }
        ctx.say(format!("⛔ Premium revoked for {user_id}")).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
