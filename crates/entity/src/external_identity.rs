use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// OAuth identity link.
///
/// Unique per (provider, provider_account_id); linking the same external
/// identity twice is a no-op rather than an error.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "external_identities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub provider: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub provider_account_id: String,

    pub user_id: String,

    /// Unix timestamp (seconds).
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
