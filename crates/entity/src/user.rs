use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Verified account record.
///
/// Rows are only created once email ownership has been proven: registration
/// keeps its payload in `pending_registrations` until the secret is redeemed,
/// so an unverified `users` row never exists on the credentials path.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Lowercase-normalized; unique at the storage layer.
    #[sea_orm(unique)]
    pub email: String,

    pub full_name: String,

    /// PBKDF2-HMAC-SHA256 output.
    pub password_hash: Vec<u8>,

    pub salt: Vec<u8>,

    pub password_iterations: i32,

    /// Unix timestamp (seconds) of successful verification; set exactly once.
    pub verified_at: Option<i64>,

    pub image: Option<String>,

    /// Unix timestamp (seconds).
    pub created_at: i64,

    /// Unix timestamp (seconds).
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
