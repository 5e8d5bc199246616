use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{Creator, CustomRequest, Post, Role, Subscription, Transaction};

// -- Loose numbers --

/// A numeric field that browsers send either as a JSON number or as a
/// string (form inputs). Anything unparseable becomes NaN.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberLike {
    Number(f64),
    Text(String),
    Flag(bool),
}

impl NumberLike {
    pub fn value(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Text(s) => parse_number(s),
            Self::Flag(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// The value when it is finite and non-zero.
    pub fn nonzero(&self) -> Option<f64> {
        let v = self.value();
        (v.is_finite() && v != 0.0).then_some(v)
    }
}

impl From<&str> for NumberLike {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Blank text counts as zero, like an empty form input.
pub fn parse_number(s: &str) -> f64 {
    let t = s.trim();
    if t.is_empty() {
        return 0.0;
    }
    t.parse::<f64>().unwrap_or(f64::NAN)
}

// -- Loose fields --

/// Scalar a client may send where text is expected.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(f64),
    Flag(bool),
}

/// Text field that also accepts numbers and booleans. `0` and `false`
/// count as empty.
fn loose_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|scalar| match scalar {
        Scalar::Text(s) => s,
        Scalar::Number(n) if n != 0.0 => n.to_string(),
        Scalar::Flag(true) => "true".to_string(),
        Scalar::Number(_) | Scalar::Flag(false) => String::new(),
    }))
}

/// PATCH field where an explicit `null` is a value: absent is `None`,
/// `null` is `Some(None)`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

// -- Auth --

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Account view returned by signup and login; never carries the password.
#[derive(Debug, Serialize)]
pub struct AuthUserResponse {
    pub id: u64,
    pub email: String,
    pub username: String,
    pub role: Role,
}

// -- Creators --

/// Text part of a creator application; the KYC files arrive alongside it.
#[derive(Debug, Default, Clone)]
pub struct CreatorApplication {
    pub display_name: String,
    pub username: String,
    pub email: String,
    pub account_type: String,
    pub price: Option<NumberLike>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCreatorResponse {
    pub success: bool,
    pub creator_id: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCreatorRequest {
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub account_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub price: Option<Option<NumberLike>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReviewCreatorRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct CreatorResponse {
    pub success: bool,
    pub creator: Creator,
}

// -- Posts --

#[derive(Debug, Default, Clone)]
pub struct NewPost {
    pub title: String,
    pub visibility: String,
    pub price: Option<NumberLike>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub visibility: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub price: Option<Option<NumberLike>>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub success: bool,
    pub post: Post,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    #[serde(default, deserialize_with = "loose_text")]
    pub fan_username: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub success: bool,
    pub post_id: u64,
    pub likes: usize,
    pub liked_by_me: bool,
}

// -- Payments --

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipRequest {
    pub amount: Option<NumberLike>,
    #[serde(default, deserialize_with = "loose_text")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub fan_username: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub fan_email: Option<String>,
    pub post_id: Option<NumberLike>,
}

#[derive(Debug, Serialize)]
pub struct TipResponse {
    pub success: bool,
    pub transaction: Transaction,
}

/// Who is paying. Both fields are optional; payments default to an
/// anonymous fan.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FanRequest {
    #[serde(default, deserialize_with = "loose_text")]
    pub fan_username: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub fan_email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_unlocked: Option<bool>,
    pub unlocked_post_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<Transaction>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_subscribed: Option<bool>,
    pub subscription: Subscription,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<Transaction>,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub success: bool,
    pub subscription: Subscription,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessQuery {
    pub fan_username: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessResponse {
    pub subscribed: bool,
    pub unlocked_post_ids: Vec<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsTotals {
    pub tips: f64,
    pub ppv: f64,
    pub subscriptions: f64,
    pub all_time: f64,
    /// Number of custom requests received; they carry no payment.
    pub custom_requests: usize,
}

#[derive(Debug, Serialize)]
pub struct EarningsResponse {
    pub creator: String,
    pub totals: EarningsTotals,
    pub transactions: Vec<Transaction>,
}

// -- Custom requests --

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomRequest {
    #[serde(default, deserialize_with = "loose_text")]
    pub message: Option<String>,
    pub budget: Option<NumberLike>,
    #[serde(default, deserialize_with = "loose_text")]
    pub fan_username: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub fan_email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RequestStatusUpdate {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct CustomRequestResponse {
    pub success: bool,
    pub request: CustomRequest,
}
