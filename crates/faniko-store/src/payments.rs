//! Simulated money movement: tips, PPV unlocks, subscriptions, and the
//! earnings they add up to. Nothing here talks to a payment provider.

use chrono::Utc;
use tracing::info;

use faniko_types::api::{AccessResponse, EarningsResponse, EarningsTotals, FanRequest, TipRequest};
use faniko_types::models::{
    AccountType, CURRENCY, Subscription, SubscriptionStatus, Transaction, TransactionKind,
    UnlockedPost,
};

use crate::validate::{MAX_TIP_MESSAGE, fan_email, fan_name, same_name, truncate_chars};
use crate::{Result, Store, StoreError, Tables};

#[derive(Debug, Clone)]
pub enum UnlockOutcome {
    AlreadyUnlocked { post_id: u64 },
    Unlocked { post_id: u64, transaction: Transaction },
}

#[derive(Debug, Clone)]
pub enum SubscribeOutcome {
    AlreadySubscribed(Subscription),
    Subscribed {
        subscription: Subscription,
        transaction: Transaction,
    },
}

impl Tables {
    #[allow(clippy::too_many_arguments)]
    fn record_transaction(
        &mut self,
        kind: TransactionKind,
        creator_username: &str,
        fan_username: &str,
        fan_email: Option<String>,
        amount: f64,
        post_id: Option<u64>,
        message: Option<String>,
    ) -> Transaction {
        let txn = Transaction {
            id: self.transaction_ids.next(),
            kind,
            creator_username: creator_username.to_string(),
            fan_username: fan_username.to_string(),
            fan_email,
            amount,
            currency: CURRENCY,
            message,
            post_id,
            created_at: Utc::now(),
        };
        self.transactions.push(txn.clone());
        txn
    }

    fn active_subscription(&self, creator_username: &str, fan_username: &str) -> Option<usize> {
        self.subscriptions.iter().position(|s| {
            s.status == SubscriptionStatus::Active
                && same_name(&s.creator_username, creator_username)
                && same_name(&s.fan_username, fan_username)
        })
    }
}

impl Store {
    pub fn tip(&self, username: &str, req: TipRequest) -> Result<Transaction> {
        self.with_tables_mut(|t| {
            let creator_username = t.creator(username)?.username.clone();

            let amount = req
                .amount
                .as_ref()
                .map(|a| a.value())
                .filter(|a| a.is_finite() && *a > 0.0)
                .ok_or(StoreError::Invalid("Please provide a valid tip amount."))?;

            let post_id = req
                .post_id
                .as_ref()
                .and_then(|p| p.nonzero())
                .filter(|p| *p > 0.0 && p.fract() == 0.0)
                .map(|p| p as u64);
            let message = truncate_chars(req.message.as_deref().unwrap_or_default(), MAX_TIP_MESSAGE);

            let txn = t.record_transaction(
                TransactionKind::Tip,
                &creator_username,
                &fan_name(req.fan_username.as_deref()),
                fan_email(req.fan_email.as_deref()),
                amount,
                post_id,
                Some(message),
            );

            info!(
                "New tip: id={} creator={} fan={} amount={}",
                txn.id, txn.creator_username, txn.fan_username, txn.amount
            );
            Ok(txn)
        })
    }

    /// Buy access to a PPV post. Paying twice for the same post is a no-op.
    pub fn unlock_post(&self, username: &str, post_id: u64, fan: FanRequest) -> Result<UnlockOutcome> {
        self.with_tables_mut(|t| {
            let creator_username = t.creator(username)?.username.clone();
            let idx = t.post_index(&creator_username, post_id)?;
            let post = &t.posts[idx];

            if !post.is_paid_ppv() {
                return Err(StoreError::Invalid("This post is not a paid PPV post."));
            }
            let (post_id, price) = (post.id, post.price.unwrap_or_default());

            let fan_username = fan_name(fan.fan_username.as_deref());
            let already = t.unlocked_posts.iter().any(|u| {
                u.post_id == post_id
                    && same_name(&u.creator_username, &creator_username)
                    && same_name(&u.fan_username, &fan_username)
            });
            if already {
                return Ok(UnlockOutcome::AlreadyUnlocked { post_id });
            }

            let transaction = t.record_transaction(
                TransactionKind::PpvUnlock,
                &creator_username,
                &fan_username,
                fan_email(fan.fan_email.as_deref()),
                price,
                Some(post_id),
                None,
            );
            t.unlocked_posts.push(UnlockedPost {
                creator_username,
                fan_username,
                post_id,
                created_at: Utc::now(),
            });

            info!(
                "PPV unlocked: post={} fan={} txn={}",
                post_id, transaction.fan_username, transaction.id
            );
            Ok(UnlockOutcome::Unlocked {
                post_id,
                transaction,
            })
        })
    }

    pub fn subscribe(&self, username: &str, fan: FanRequest) -> Result<SubscribeOutcome> {
        self.with_tables_mut(|t| {
            let creator = t.creator(username)?;
            if creator.account_type != AccountType::Subscription {
                return Err(StoreError::Invalid(
                    "This creator does not have a subscription plan.",
                ));
            }
            let price = creator
                .price
                .filter(|p| *p > 0.0)
                .ok_or(StoreError::Invalid(
                    "This creator's subscription price is not configured.",
                ))?;
            let creator_username = creator.username.clone();

            let fan_username = fan_name(fan.fan_username.as_deref());
            if let Some(idx) = t.active_subscription(&creator_username, &fan_username) {
                return Ok(SubscribeOutcome::AlreadySubscribed(t.subscriptions[idx].clone()));
            }

            let email = fan_email(fan.fan_email.as_deref());
            let subscription = Subscription {
                id: t.subscription_ids.next(),
                creator_username: creator_username.clone(),
                fan_username: fan_username.clone(),
                fan_email: email.clone(),
                price,
                currency: CURRENCY,
                status: SubscriptionStatus::Active,
                created_at: Utc::now(),
            };
            t.subscriptions.push(subscription.clone());

            let transaction = t.record_transaction(
                TransactionKind::Subscription,
                &creator_username,
                &fan_username,
                email,
                price,
                None,
                None,
            );

            info!(
                "New subscription: id={} creator={} fan={} txn={}",
                subscription.id, creator_username, fan_username, transaction.id
            );
            Ok(SubscribeOutcome::Subscribed {
                subscription,
                transaction,
            })
        })
    }

    /// Cancel a fan's active subscription. Past payments are kept.
    pub fn unsubscribe(&self, username: &str, fan_username: Option<&str>) -> Result<Subscription> {
        self.with_tables_mut(|t| {
            let creator_username = t.creator(username)?.username.clone();
            let fan_username = fan_name(fan_username);

            let idx = t
                .active_subscription(&creator_username, &fan_username)
                .ok_or(StoreError::NotFound("Subscription not found"))?;
            let subscription = &mut t.subscriptions[idx];
            subscription.status = SubscriptionStatus::Cancelled;

            info!(
                "Cancelled subscription: id={} creator={} fan={}",
                subscription.id, creator_username, fan_username
            );
            Ok(subscription.clone())
        })
    }

    /// What a fan has paid for on one creator's page.
    pub fn access(&self, username: &str, fan_username: Option<&str>) -> Result<AccessResponse> {
        self.with_tables(|t| {
            let creator_username = &t.creator(username)?.username;
            let fan_username = fan_name(fan_username);

            let subscribed = t.active_subscription(creator_username, &fan_username).is_some();
            let unlocked_post_ids = t
                .unlocked_posts
                .iter()
                .filter(|u| {
                    same_name(&u.creator_username, creator_username)
                        && same_name(&u.fan_username, &fan_username)
                })
                .map(|u| u.post_id)
                .collect();

            Ok(AccessResponse {
                subscribed,
                unlocked_post_ids,
            })
        })
    }

    pub fn earnings(&self, username: &str) -> Result<EarningsResponse> {
        self.with_tables(|t| {
            let creator_username = t.creator(username)?.username.clone();

            let transactions: Vec<Transaction> = t
                .transactions
                .iter()
                .filter(|txn| same_name(&txn.creator_username, &creator_username))
                .cloned()
                .collect();

            let mut totals = tally(&transactions);
            totals.custom_requests = t.request_count(&creator_username);

            Ok(EarningsResponse {
                totals,
                creator: creator_username,
                transactions,
            })
        })
    }
}

/// Sum transaction amounts per kind.
pub fn tally(transactions: &[Transaction]) -> EarningsTotals {
    let mut totals = EarningsTotals::default();
    for txn in transactions {
        match txn.kind {
            TransactionKind::Tip => totals.tips += txn.amount,
            TransactionKind::PpvUnlock => totals.ppv += txn.amount,
            TransactionKind::Subscription => totals.subscriptions += txn.amount,
        }
    }
    totals.all_time = totals.tips + totals.ppv + totals.subscriptions;
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creators::KycFiles;
    use faniko_types::api::{CreatorApplication, NewPost, NumberLike};

    fn setup() -> Store {
        let store = Store::new();
        store
            .create_creator(
                CreatorApplication {
                    display_name: "Luna".into(),
                    username: "luna".into(),
                    email: "luna@x.io".into(),
                    account_type: "subscription".into(),
                    price: Some(NumberLike::from("10")),
                },
                KycFiles::default(),
            )
            .unwrap();
        store
            .create_post(
                "luna",
                NewPost {
                    title: "Locked".into(),
                    visibility: "ppv".into(),
                    price: Some(NumberLike::from("5")),
                    description: None,
                },
                None,
            )
            .unwrap();
        store
            .create_post(
                "luna",
                NewPost {
                    title: "Open".into(),
                    visibility: "free".into(),
                    price: None,
                    description: None,
                },
                None,
            )
            .unwrap();
        store
    }

    fn fan(name: &str) -> FanRequest {
        FanRequest {
            fan_username: Some(name.into()),
            fan_email: None,
        }
    }

    #[test]
    fn test_tip_validation_and_defaults() {
        let store = setup();
        for bad in [None, Some(NumberLike::Number(0.0)), Some(NumberLike::from("-2")), Some(NumberLike::from("x"))] {
            let err = store
                .tip(
                    "luna",
                    TipRequest {
                        amount: bad,
                        ..Default::default()
                    },
                )
                .unwrap_err();
            assert!(matches!(err, StoreError::Invalid("Please provide a valid tip amount.")));
        }

        let txn = store
            .tip(
                "LUNA",
                TipRequest {
                    amount: Some(NumberLike::from("7.5")),
                    message: Some("x".repeat(600)),
                    post_id: Some(NumberLike::from("1")),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(txn.kind, TransactionKind::Tip);
        assert_eq!(txn.amount, 7.5);
        assert_eq!(txn.fan_username, "anonymous");
        assert_eq!(txn.fan_email, None);
        assert_eq!(txn.post_id, Some(1));
        assert_eq!(txn.message.as_ref().map(|m| m.len()), Some(500));
        assert_eq!(txn.creator_username, "luna");
    }

    #[test]
    fn test_unlock_is_idempotent_per_fan() {
        let store = setup();
        let first = store.unlock_post("luna", 1, fan("bob")).unwrap();
        let UnlockOutcome::Unlocked { transaction, .. } = first else {
            panic!("expected a fresh unlock");
        };
        assert_eq!(transaction.amount, 5.0);
        assert_eq!(transaction.post_id, Some(1));

        let again = store.unlock_post("luna", 1, fan("BOB")).unwrap();
        assert!(matches!(again, UnlockOutcome::AlreadyUnlocked { post_id: 1 }));

        assert!(matches!(
            store.unlock_post("luna", 1, fan("ann")).unwrap(),
            UnlockOutcome::Unlocked { .. }
        ));
        let txns = store.with_tables(|t| Ok(t.transactions.len())).unwrap();
        assert_eq!(txns, 2);
    }

    #[test]
    fn test_anonymous_unlock_is_idempotent() {
        let store = setup();
        store.unlock_post("luna", 1, FanRequest::default()).unwrap();
        let again = store.unlock_post("luna", 1, FanRequest::default()).unwrap();
        assert!(matches!(again, UnlockOutcome::AlreadyUnlocked { .. }));
    }

    #[test]
    fn test_unlock_rejections() {
        let store = setup();
        let err = store.unlock_post("luna", 2, fan("bob")).unwrap_err();
        assert!(matches!(err, StoreError::Invalid("This post is not a paid PPV post.")));

        let err = store.unlock_post("luna", 42, fan("bob")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound("Post not found")));

        let err = store.unlock_post("ghost", 1, fan("bob")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound("Creator not found")));
    }

    #[test]
    fn test_subscribe_and_cancel() {
        let store = setup();
        let SubscribeOutcome::Subscribed { subscription, transaction } =
            store.subscribe("luna", fan("bob")).unwrap()
        else {
            panic!("expected a new subscription");
        };
        assert_eq!(subscription.price, 10.0);
        assert_eq!(subscription.status, SubscriptionStatus::Active);
        assert_eq!(transaction.kind, TransactionKind::Subscription);
        assert_eq!(transaction.post_id, None);

        assert!(matches!(
            store.subscribe("luna", fan("bob")).unwrap(),
            SubscribeOutcome::AlreadySubscribed(s) if s.id == subscription.id
        ));

        let cancelled = store.unsubscribe("luna", Some("bob")).unwrap();
        assert_eq!(cancelled.status, SubscriptionStatus::Cancelled);
        assert!(matches!(
            store.unsubscribe("luna", Some("bob")),
            Err(StoreError::NotFound("Subscription not found"))
        ));

        // A cancelled fan can subscribe again and pays again.
        assert!(matches!(
            store.subscribe("luna", fan("bob")).unwrap(),
            SubscribeOutcome::Subscribed { .. }
        ));
    }

    #[test]
    fn test_subscribe_requires_plan() {
        let store = setup();
        store
            .update_creator(
                "luna",
                faniko_types::api::UpdateCreatorRequest {
                    account_type: Some(Some("free".into())),
                    ..Default::default()
                },
            )
            .unwrap();
        let err = store.subscribe("luna", fan("bob")).unwrap_err();
        assert!(matches!(err, StoreError::Invalid(m) if m.contains("subscription plan")));

        store
            .update_creator(
                "luna",
                faniko_types::api::UpdateCreatorRequest {
                    account_type: Some(Some("subscription".into())),
                    ..Default::default()
                },
            )
            .unwrap();
        let err = store.subscribe("luna", fan("bob")).unwrap_err();
        assert!(matches!(err, StoreError::Invalid(m) if m.contains("not configured")));
    }

    #[test]
    fn test_access_reports_unlocks_and_subscription() {
        let store = setup();
        store.unlock_post("luna", 1, fan("bob")).unwrap();
        store.subscribe("luna", fan("bob")).unwrap();

        let access = store.access("luna", Some("bob")).unwrap();
        assert!(access.subscribed);
        assert_eq!(access.unlocked_post_ids, vec![1]);

        let other = store.access("luna", Some("ann")).unwrap();
        assert!(!other.subscribed);
        assert!(other.unlocked_post_ids.is_empty());
    }

    #[test]
    fn test_earnings_survive_post_deletion() {
        let store = setup();
        store
            .tip(
                "luna",
                TipRequest {
                    amount: Some(NumberLike::Number(2.5)),
                    ..Default::default()
                },
            )
            .unwrap();
        store.unlock_post("luna", 1, fan("bob")).unwrap();
        store.subscribe("luna", fan("bob")).unwrap();
        store.delete_post("luna", 1).unwrap();

        let earnings = store.earnings("Luna").unwrap();
        assert_eq!(earnings.creator, "luna");
        assert_eq!(
            earnings.totals,
            EarningsTotals {
                tips: 2.5,
                ppv: 5.0,
                subscriptions: 10.0,
                all_time: 17.5,
                custom_requests: 0,
            }
        );
        assert_eq!(earnings.transactions.len(), 3);
    }
}
