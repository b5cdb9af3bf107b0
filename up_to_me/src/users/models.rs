//! User data models.

use serde::{Deserialize, Serialize};

/// A resolved application user.
///
/// `external_id` is the stable subject issued by the identity provider;
/// `push_token` is the contact token for push notifications, absent until
/// the user registers a device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppUser {
    pub id: i64,
    pub external_id: String,
    pub display_name: String,
    pub push_token: Option<String>,
}
