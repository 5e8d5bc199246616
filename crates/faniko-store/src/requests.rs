//! Custom content requests: a fan describes what they want and offers a
//! budget, the creator works through them in an inbox. No money moves.

use chrono::Utc;
use tracing::info;

use faniko_types::api::NewCustomRequest;
use faniko_types::models::{CURRENCY, CustomRequest, RequestStatus};

use crate::validate::{
    MAX_REQUEST_MESSAGE, fan_email, fan_name, non_blank, same_name, truncate_chars,
};
use crate::{REQUEST_NOT_FOUND, Result, Store, StoreError, Tables};

impl Tables {
    pub fn request_count(&self, creator_username: &str) -> usize {
        self.custom_requests
            .iter()
            .filter(|r| same_name(&r.creator_username, creator_username))
            .count()
    }
}

impl Store {
    pub fn create_request(&self, username: &str, req: NewCustomRequest) -> Result<CustomRequest> {
        self.with_tables_mut(|t| {
            let creator_username = t.creator(username)?.username.clone();

            let message = non_blank(req.message.as_deref())
                .ok_or(StoreError::Invalid("Please describe what you want."))?;
            let budget = req
                .budget
                .as_ref()
                .map(|b| b.value())
                .filter(|b| b.is_finite() && *b > 0.0)
                .ok_or(StoreError::Invalid("Please enter a valid budget."))?;

            let request = CustomRequest {
                id: t.request_ids.next(),
                creator_username,
                fan_username: fan_name(req.fan_username.as_deref()),
                fan_email: fan_email(req.fan_email.as_deref()),
                budget,
                currency: CURRENCY,
                message: truncate_chars(&message, MAX_REQUEST_MESSAGE),
                status: RequestStatus::New,
                created_at: Utc::now(),
            };
            t.custom_requests.push(request.clone());

            info!(
                "New custom request: id={} creator={} fan={} budget={}",
                request.id, request.creator_username, request.fan_username, request.budget
            );
            Ok(request)
        })
    }

    /// A creator's inbox, oldest first.
    pub fn list_requests(&self, username: &str) -> Result<Vec<CustomRequest>> {
        self.with_tables(|t| {
            let creator_username = &t.creator(username)?.username;
            Ok(t.custom_requests
                .iter()
                .filter(|r| same_name(&r.creator_username, creator_username))
                .cloned()
                .collect())
        })
    }

    /// Move a request along its lifecycle. Setting the current status again
    /// changes nothing.
    pub fn update_request_status(
        &self,
        username: &str,
        request_id: u64,
        status: &str,
    ) -> Result<CustomRequest> {
        self.with_tables_mut(|t| {
            let creator_username = t.creator(username)?.username.clone();
            let status =
                RequestStatus::parse(status.trim()).ok_or(StoreError::Invalid("Invalid status"))?;

            let request = t
                .custom_requests
                .iter_mut()
                .find(|r| r.id == request_id && same_name(&r.creator_username, &creator_username))
                .ok_or(StoreError::NotFound(REQUEST_NOT_FOUND))?;

            if request.status != status {
                if !request.status.can_move_to(status) {
                    return Err(StoreError::Conflict(
                        "This request can no longer move to that status.",
                    ));
                }
                request.status = status;
                info!("Custom request {} is now {:?}", request.id, status);
            }
            Ok(request.clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creators::KycFiles;
    use faniko_types::api::{CreatorApplication, NumberLike};

    fn setup() -> Store {
        let store = Store::new();
        for username in ["luna", "sol"] {
            store
                .create_creator(
                    CreatorApplication {
                        display_name: username.into(),
                        username: username.into(),
                        email: format!("{username}@x.io"),
                        account_type: "free".into(),
                        price: None,
                    },
                    KycFiles::default(),
                )
                .unwrap();
        }
        store
    }

    fn ask(message: &str, budget: NumberLike) -> NewCustomRequest {
        NewCustomRequest {
            message: Some(message.into()),
            budget: Some(budget),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_request_validation_and_defaults() {
        let store = setup();

        let err = store
            .create_request("luna", ask("   ", NumberLike::Number(20.0)))
            .unwrap_err();
        assert!(matches!(err, StoreError::Invalid("Please describe what you want.")));

        for bad in [NumberLike::Number(0.0), NumberLike::from("-5"), NumberLike::from("lots")] {
            let err = store.create_request("luna", ask("A video", bad)).unwrap_err();
            assert!(matches!(err, StoreError::Invalid("Please enter a valid budget.")));
        }
        let err = store
            .create_request(
                "luna",
                NewCustomRequest {
                    message: Some("A video".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Invalid("Please enter a valid budget.")));

        let err = store
            .create_request("ghost", ask("A video", NumberLike::Number(5.0)))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound("Creator not found")));

        let request = store
            .create_request("LUNA", ask("  A short shoutout  ", NumberLike::from("25.00")))
            .unwrap();
        assert_eq!(request.id, 1);
        assert_eq!(request.creator_username, "luna");
        assert_eq!(request.fan_username, "anonymous");
        assert_eq!(request.fan_email, None);
        assert_eq!(request.budget, 25.0);
        assert_eq!(request.message, "A short shoutout");
        assert_eq!(request.status, RequestStatus::New);
    }

    #[test]
    fn test_inbox_is_per_creator() {
        let store = setup();
        store
            .create_request("luna", ask("first", NumberLike::Number(10.0)))
            .unwrap();
        store
            .create_request("sol", ask("other", NumberLike::Number(10.0)))
            .unwrap();
        store
            .create_request(
                "luna",
                NewCustomRequest {
                    fan_username: Some("bob".into()),
                    ..ask("second", NumberLike::Number(40.0))
                },
            )
            .unwrap();

        let inbox = store.list_requests("luna").unwrap();
        let messages: Vec<&str> = inbox.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, ["first", "second"]);
        assert_eq!(inbox[1].fan_username, "bob");

        let totals = store.earnings("luna").unwrap().totals;
        assert_eq!(totals.custom_requests, 2);
        assert_eq!(totals.all_time, 0.0);

        assert!(matches!(
            store.list_requests("ghost"),
            Err(StoreError::NotFound("Creator not found"))
        ));
    }

    #[test]
    fn test_status_lifecycle() {
        let store = setup();
        let id = store
            .create_request("luna", ask("photoset", NumberLike::Number(120.0)))
            .unwrap()
            .id;

        let err = store.update_request_status("luna", id, "done").unwrap_err();
        assert!(matches!(err, StoreError::Invalid("Invalid status")));

        let err = store.update_request_status("luna", id, "completed").unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let r = store.update_request_status("luna", id, " accepted ").unwrap();
        assert_eq!(r.status, RequestStatus::Accepted);
        let r = store.update_request_status("luna", id, "accepted").unwrap();
        assert_eq!(r.status, RequestStatus::Accepted);

        let r = store.update_request_status("luna", id, "completed").unwrap();
        assert_eq!(r.status, RequestStatus::Completed);
        let err = store.update_request_status("luna", id, "declined").unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        // Another creator cannot touch it.
        let err = store.update_request_status("sol", id, "declined").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(REQUEST_NOT_FOUND)));
    }
}
