use crate::sanitize::SafeHtml;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Post form / JSON body. Field names follow the board's HTML form.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct PostRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub password: String,
}

// Stored board message - every text field is already escaped
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Message {
    pub username: SafeHtml,
    pub body: SafeHtml,
    pub signature: Option<SafeHtml>,
    pub posted_at: DateTime<Utc>,
}
