use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a user
pub type UserId = i64;

/// A catalog user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Request body for creating a user
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct NewUser {
    pub username: String,
}

/// Request body for marking a movie as favorite
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct NewFavorite {
    pub movie_id: super::MovieId,
}
