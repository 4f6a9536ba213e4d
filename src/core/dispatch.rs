//! Forward dispatcher - fans one inbound message out to every active mapping of its source.
//!
//! For each distinct owner among the matching mappings the quota is evaluated once, all of
//! that owner's destinations get a best-effort copy, and a chargeable owner is debited once
//! after the attempts regardless of how many copies succeeded. Owners are processed
//! concurrently and so are the copies of one owner (bounded), each copy under its own timeout.

use crate::{
    core::{
        mapping,
        platform::{ChatId, ChatPlatform, InboundMessage},
        quota::QuotaPolicy,
        user,
    },
    entities::mapping::Model as MappingModel,
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use futures_util::{StreamExt, future::join_all, stream};
use sea_orm::DatabaseConnection;
use std::{collections::BTreeMap, future::Future, pin::Pin, sync::Arc, time::Duration};
use tracing::{debug, error, instrument, warn};

const DEFAULT_COPY_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_MAX_CONCURRENT_COPIES: usize = 8;

/// One boxed copy attempt of an owner's fan-out.
type CopyFuture<'a> = Pin<Box<dyn Future<Output = bool> + Send + 'a>>;

/// What happened to one owner's destinations for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerOutcome {
    /// Copies were attempted
    Forwarded {
        /// Whether the owner's daily counter was incremented
        charged: bool,
        /// Copies the platform accepted
        delivered: usize,
        /// Copies that failed or timed out
        failed: usize,
    },
    /// Daily limit reached; nothing attempted, nothing charged
    QuotaExceeded {
        /// Destinations that were skipped
        skipped: usize,
    },
    /// Mappings reference a user the registry does not know
    UnknownOwner,
    /// The owner's state could not be read
    Failed,
}

/// Per-owner result of a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerDispatch {
    /// Owner of the mappings
    pub owner_id: i64,
    /// What happened
    pub outcome: OwnerOutcome,
}

/// Summary of one [`ForwardDispatcher::dispatch`] call, one entry per distinct owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Owners in ascending id order
    pub owners: Vec<OwnerDispatch>,
}

impl DispatchReport {
    /// True when no active mapping matched the source.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Outcome for a given owner, if they had matching mappings.
    #[must_use]
    pub fn outcome_for(&self, owner_id: i64) -> Option<OwnerOutcome> {
        self.owners
            .iter()
            .find(|o| o.owner_id == owner_id)
            .map(|o| o.outcome)
    }

    /// Total copies delivered across owners.
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.owners
            .iter()
            .map(|o| match o.outcome {
                OwnerOutcome::Forwarded { delivered, .. } => delivered,
                _ => 0,
            })
            .sum()
    }
}

/// Routes inbound messages to their destinations under quota control.
pub struct ForwardDispatcher<P> {
    database: DatabaseConnection,
    platform: Arc<P>,
    policy: QuotaPolicy,
    copy_timeout: Duration,
    max_concurrent_copies: usize,
}

impl<P: ChatPlatform> ForwardDispatcher<P> {
    /// Creates a dispatcher with default copy timeout and concurrency.
    #[must_use]
    pub fn new(database: DatabaseConnection, platform: Arc<P>, policy: QuotaPolicy) -> Self {
        Self {
            database,
            platform,
            policy,
            copy_timeout: DEFAULT_COPY_TIMEOUT,
            max_concurrent_copies: DEFAULT_MAX_CONCURRENT_COPIES,
        }
    }

    /// Upper bound for a single copy request.
    #[must_use]
    pub fn with_copy_timeout(mut self, copy_timeout: Duration) -> Self {
        self.copy_timeout = copy_timeout;
        self
    }

    /// How many copies for one owner may be in flight at once (at least one).
    #[must_use]
    pub fn with_max_concurrent_copies(mut self, max_concurrent_copies: usize) -> Self {
        self.max_concurrent_copies = max_concurrent_copies.max(1);
        self
    }

    /// The platform client copies go through.
    #[must_use]
    pub const fn platform(&self) -> &Arc<P> {
        &self.platform
    }

    /// The quota policy in force.
    #[must_use]
    pub const fn policy(&self) -> QuotaPolicy {
        self.policy
    }

    /// Forwards `message` to every active mapping of its source chat.
    ///
    /// Only a failure to look up the mappings is returned as an error. Everything after that
    /// (unknown owners, copy failures, timeouts, a failed debit) is logged and reflected in
    /// the report instead.
    #[instrument(skip(self, message), fields(source = %message.source_chat, message_id = message.message_id))]
    pub async fn dispatch(&self, message: &InboundMessage) -> Result<DispatchReport> {
        let mappings =
            mapping::resolve_active_by_source(&self.database, &message.source_chat).await?;
        if mappings.is_empty() {
            return Ok(DispatchReport::default());
        }

        let now = Utc::now();
        let owners = join_all(group_by_owner(mappings).into_iter().map(
            |(owner_id, targets)| async move {
                let outcome = self
                    .dispatch_for_owner(owner_id, &targets, message, now)
                    .await;
                OwnerDispatch { owner_id, outcome }
            },
        ))
        .await;

        debug!(owners = owners.len(), "Dispatch finished");
        Ok(DispatchReport { owners })
    }

    async fn dispatch_for_owner(
        &self,
        owner_id: i64,
        targets: &[MappingModel],
        message: &InboundMessage,
        now: DateTime<Utc>,
    ) -> OwnerOutcome {
        let owner = match user::get_user(&self.database, owner_id).await {
            Ok(Some(owner)) => owner,
            Ok(None) => {
                warn!(owner_id, "Skipping mappings of unknown owner");
                return OwnerOutcome::UnknownOwner;
            }
            Err(e) => {
                error!(owner_id, error = %e, "Failed to load mapping owner");
                return OwnerOutcome::Failed;
            }
        };

        let decision = self.policy.evaluate(&owner, now);
        if !decision.is_allowed() {
            debug!(owner_id, daily_count = owner.daily_count, "Daily quota exhausted");
            return OwnerOutcome::QuotaExceeded {
                skipped: targets.len(),
            };
        }

        let copies: Vec<CopyFuture<'_>> = targets
            .iter()
            .map(|target| Box::pin(self.copy_one(target, message)) as CopyFuture<'_>)
            .collect();
        let attempts: Vec<bool> = stream::iter(copies)
            .buffer_unordered(self.max_concurrent_copies)
            .collect()
            .await;
        let delivered = attempts.iter().filter(|ok| **ok).count();
        let failed = targets.len() - delivered;

        let charged = decision.is_chargeable()
            && match user::increment_daily_count(&self.database, owner_id).await {
                Ok(daily_count) => {
                    debug!(owner_id, daily_count, "Quota debited");
                    true
                }
                Err(e) => {
                    error!(owner_id, error = %e, "Failed to debit quota");
                    false
                }
            };

        OwnerOutcome::Forwarded {
            charged,
            delivered,
            failed,
        }
    }

    async fn copy_one(&self, target: &MappingModel, message: &InboundMessage) -> bool {
        let destination = match ChatId::parse(&target.target_chat) {
            Ok(destination) => destination,
            Err(e) => {
                warn!(mapping_id = target.id, error = %e, "Mapping has an unusable target");
                return false;
            }
        };

        let attempt = tokio::time::timeout(
            self.copy_timeout,
            self.platform
                .copy(&destination, &message.source_chat, message.message_id),
        )
        .await
        .unwrap_or_else(|_| {
            Err(Error::CopyTimeout {
                destination: destination.to_string(),
            })
        });

        match attempt {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    mapping_id = target.id,
                    destination = %destination,
                    error = %e,
                    "Copy failed"
                );
                false
            }
        }
    }
}

fn group_by_owner(mappings: Vec<MappingModel>) -> BTreeMap<i64, Vec<MappingModel>> {
    let mut grouped: BTreeMap<i64, Vec<MappingModel>> = BTreeMap::new();
    for m in mappings {
        grouped.entry(m.owner_id).or_default().push(m);
    }
    grouped
}
