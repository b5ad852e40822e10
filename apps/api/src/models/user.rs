use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Platform roles, stored and transported by their display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    #[serde(rename = "Bid Creator")]
    BidCreator,
    #[serde(rename = "Bid Reviewer")]
    BidReviewer,
    #[serde(rename = "Bid Viewer")]
    BidViewer,
    Manager,
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::BidCreator => "Bid Creator",
            Role::BidReviewer => "Bid Reviewer",
            Role::BidViewer => "Bid Viewer",
            Role::Manager => "Manager",
            Role::Client => "Client",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Role::Admin),
            "Bid Creator" => Ok(Role::BidCreator),
            "Bid Reviewer" => Ok(Role::BidReviewer),
            "Bid Viewer" => Ok(Role::BidViewer),
            "Manager" => Ok(Role::Manager),
            "Client" => Ok(Role::Client),
            other => Err(anyhow::anyhow!("unknown role '{other}'")),
        }
    }
}

/// A registered platform user. The password hash column is never selected here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}
