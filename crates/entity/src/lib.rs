pub mod external_identity;
pub mod pending_registration;
pub mod profile;
pub mod user;

pub use external_identity::Entity as ExternalIdentity;
pub use pending_registration::Entity as PendingRegistration;
pub use profile::Entity as Profile;
pub use user::Entity as User;
