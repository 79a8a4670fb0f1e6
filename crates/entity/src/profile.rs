use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Demographics attached to an account (1:0..1 with `users`).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,

    /// ISO `YYYY-MM-DD`.
    pub date_of_birth: Option<String>,

    pub gender: Option<String>,

    pub bio: Option<String>,

    /// Unix timestamp (seconds).
    pub created_at: i64,

    /// Unix timestamp (seconds).
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
