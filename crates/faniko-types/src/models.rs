use chrono::{DateTime, Utc};
use serde::Serialize;

/// Every amount the platform records is in US dollars.
pub const CURRENCY: &str = "USD";

/// Fan name recorded when a payment arrives without one.
pub const ANONYMOUS_FAN: &str = "anonymous";

// -- Enumerations --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Fan,
    Creator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Free,
    Subscription,
}

impl AccountType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "free" => Some(Self::Free),
            "subscription" => Some(Self::Subscription),
            _ => None,
        }
    }
}

/// KYC review state of a creator application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CreatorStatus {
    Pending,
    Approved,
    Rejected,
}

impl CreatorStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Free,
    Ppv,
}

impl Visibility {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "free" => Some(Self::Free),
            "ppv" => Some(Self::Ppv),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Tip,
    PpvUnlock,
    Subscription,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
}

/// Lifecycle of a custom content request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    New,
    Accepted,
    Completed,
    Declined,
}

impl RequestStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "accepted" => Some(Self::Accepted),
            "completed" => Some(Self::Completed),
            "declined" => Some(Self::Declined),
            _ => None,
        }
    }

    /// New requests are accepted or declined; accepted ones are completed
    /// or declined. Completed and declined are final.
    pub fn can_move_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::New, Self::Accepted)
                | (Self::New, Self::Declined)
                | (Self::Accepted, Self::Completed)
                | (Self::Accepted, Self::Declined)
        )
    }
}

// -- Records --

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub email: String,
    pub username: String,
    /// Argon2 PHC string; never leaves the process.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    pub id: u64,
    pub display_name: String,
    pub username: String,
    pub email: String,
    pub account_type: AccountType,
    pub price: Option<f64>,
    pub id_front_path: Option<String>,
    pub id_back_path: Option<String>,
    pub selfie_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub status: CreatorStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub creator_id: u64,
    pub username: String,
    pub title: String,
    pub visibility: Visibility,
    pub price: Option<f64>,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub media_filename: Option<String>,
    pub media_mime: Option<String>,
    pub likes: usize,
    pub liked_by: Vec<String>,
}

impl Post {
    /// True when the post can actually be bought.
    pub fn is_paid_ppv(&self) -> bool {
        self.visibility == Visibility::Ppv && self.price.is_some_and(|p| p > 0.0)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub creator_username: String,
    pub fan_username: String,
    pub fan_email: Option<String>,
    pub amount: f64,
    pub currency: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub post_id: Option<u64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: u64,
    pub creator_username: String,
    pub fan_username: String,
    pub fan_email: Option<String>,
    pub price: f64,
    pub currency: &'static str,
    pub status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockedPost {
    pub creator_username: String,
    pub fan_username: String,
    pub post_id: u64,
    pub created_at: DateTime<Utc>,
}

/// A fan asking a creator for custom content, with the budget they offer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomRequest {
    pub id: u64,
    pub creator_username: String,
    pub fan_username: String,
    pub fan_email: Option<String>,
    pub budget: f64,
    pub currency: &'static str,
    pub message: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_status_transitions() {
        use RequestStatus::*;
        assert!(New.can_move_to(Accepted));
        assert!(New.can_move_to(Declined));
        assert!(Accepted.can_move_to(Completed));
        assert!(!New.can_move_to(Completed));
        assert!(!Completed.can_move_to(Declined));
        assert!(!Declined.can_move_to(Accepted));
        assert_eq!(RequestStatus::parse("accepted"), Some(Accepted));
        assert_eq!(RequestStatus::parse("Accepted"), None);
    }
}
