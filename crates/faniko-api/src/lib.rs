pub mod auth;
pub mod creators;
pub mod error;
pub mod payments;
pub mod posts;
pub mod requests;
pub mod routes;
pub mod state;
pub mod storage;
pub mod uploads;
