//! Validated value types.

mod account_status;
mod api_url;

pub use account_status::AccountStatus;
pub use api_url::ApiUrl;
