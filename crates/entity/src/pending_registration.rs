use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Outstanding registration awaiting email verification.
///
/// Holds both the verification secret and the deferred account payload, so no
/// `users` row exists until the secret is redeemed. At most one row per email:
/// issuing a new secret deletes any prior row for that address (supersede).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "pending_registrations")]
pub struct Model {
    /// Opaque verification token (256-bit, hex).
    #[sea_orm(primary_key, auto_increment = false)]
    pub token: String,

    /// Lowercase-normalized.
    pub email: String,

    pub full_name: String,

    pub password_hash: Vec<u8>,

    pub salt: Vec<u8>,

    pub password_iterations: i32,

    /// Unix timestamp (seconds).
    pub created_at: i64,

    /// Unix timestamp (seconds).
    pub expires_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
