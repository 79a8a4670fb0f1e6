pub use sea_orm_migration::prelude::*;

mod m20260815_000001_users;
mod m20260815_000002_pending_registrations;
mod m20260816_000003_profiles;
mod m20260816_000004_external_identities;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260815_000001_users::Migration),
            Box::new(m20260815_000002_pending_registrations::Migration),
            Box::new(m20260816_000003_profiles::Migration),
            Box::new(m20260816_000004_external_identities::Migration),
        ]
    }
}
