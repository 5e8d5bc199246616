use chrono::Utc;
use tracing::info;

use faniko_types::api::{CreatorApplication, NumberLike, UpdateCreatorRequest};
use faniko_types::models::{AccountType, Creator, CreatorStatus, Role};

use crate::validate::{non_blank, normalize, same_name};
use crate::{Result, Store, StoreError};

/// Stored filenames of the identity documents sent with an application.
#[derive(Debug, Default, Clone)]
pub struct KycFiles {
    pub id_front: Option<String>,
    pub id_back: Option<String>,
    pub selfie: Option<String>,
}

impl Store {
    /// File a creator application. A fan account with the same email is
    /// upgraded to the creator role.
    pub fn create_creator(&self, app: CreatorApplication, kyc: KycFiles) -> Result<Creator> {
        let display_name = app.display_name.trim().to_string();
        let username = normalize(&app.username);
        let email = normalize(&app.email);
        let account_type = app.account_type.trim();

        info!(
            "New creator application: display_name={} username={} email={} account_type={}",
            display_name, username, email, account_type
        );

        if display_name.is_empty() || username.is_empty() || email.is_empty() || account_type.is_empty()
        {
            return Err(StoreError::Invalid("Missing required fields"));
        }
        let account_type =
            AccountType::parse(account_type).ok_or(StoreError::Invalid("Invalid account type"))?;

        let price = match account_type {
            AccountType::Subscription => app.price.as_ref().and_then(|p| p.nonzero()),
            AccountType::Free => None,
        };

        self.with_tables_mut(|t| {
            if t.creators.iter().any(|c| same_name(&c.username, &username)) {
                return Err(StoreError::Conflict("That creator username is already taken."));
            }
            if t.creators.iter().any(|c| same_name(&c.email, &email)) {
                return Err(StoreError::Conflict(
                    "This email is already linked to a creator account. Try logging in instead.",
                ));
            }

            let creator = Creator {
                id: t.creator_ids.next(),
                display_name,
                username,
                email,
                account_type,
                price,
                id_front_path: kyc.id_front,
                id_back_path: kyc.id_back,
                selfie_path: kyc.selfie,
                created_at: Utc::now(),
                status: CreatorStatus::Pending,
            };
            t.creators.push(creator.clone());
            info!("Saved creator: id={} username={}", creator.id, creator.username);

            if let Some(user) = t.users.iter_mut().find(|u| u.email == creator.email) {
                user.role = Role::Creator;
                info!(
                    "Upgraded user to creator: id={} username={}",
                    user.id, user.username
                );
            }

            Ok(creator)
        })
    }

    pub fn list_creators(&self) -> Result<Vec<Creator>> {
        self.with_tables(|t| Ok(t.creators.clone()))
    }

    pub fn get_creator(&self, username: &str) -> Result<Creator> {
        self.with_tables(|t| t.creator(username).cloned())
    }

    /// Partial profile update. Switching to a free account clears the price.
    pub fn update_creator(&self, username: &str, req: UpdateCreatorRequest) -> Result<Creator> {
        self.with_tables_mut(|t| {
            let idx = t.creator_index(username)?;
            let creator = &mut t.creators[idx];

            let account_type = req
                .account_type
                .as_ref()
                .map(|raw| {
                    raw.as_deref()
                        .and_then(AccountType::parse)
                        .ok_or(StoreError::Invalid("Invalid account type"))
                })
                .transpose()?;

            if let Some(name) = non_blank(req.display_name.as_deref()) {
                creator.display_name = name;
            }

            let requested_price = req
                .price
                .as_ref()
                .and_then(Option::as_ref)
                .and_then(NumberLike::nonzero);
            match account_type {
                Some(AccountType::Subscription) => {
                    creator.account_type = AccountType::Subscription;
                    creator.price = Some(requested_price.or(creator.price).unwrap_or(0.0));
                }
                Some(AccountType::Free) => {
                    creator.account_type = AccountType::Free;
                    creator.price = None;
                }
                None => {
                    if req.price.is_some() && creator.account_type == AccountType::Subscription {
                        creator.price = Some(requested_price.unwrap_or(0.0));
                    }
                }
            }

            info!(
                "Updated creator profile: username={} account_type={:?} price={:?}",
                creator.username, creator.account_type, creator.price
            );
            Ok(creator.clone())
        })
    }

    /// Record the outcome of a KYC review.
    pub fn review_creator(&self, username: &str, status: &str) -> Result<Creator> {
        self.with_tables_mut(|t| {
            let idx = t.creator_index(username)?;
            let status =
                CreatorStatus::parse(status.trim()).ok_or(StoreError::Invalid("Invalid status"))?;
            let creator = &mut t.creators[idx];
            creator.status = status;
            info!("Creator {} review status: {:?}", creator.username, status);
            Ok(creator.clone())
        })
    }
}
