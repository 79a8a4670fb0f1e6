//! OAuth identity linking against the credential store.
//!
//! Only the storage side lives here; the provider handshake is owned by
//! whatever fronts this service. Linking is idempotent per
//! (provider, provider_account_id) and never bypasses the unique-email
//! invariant: an existing account is linked, never duplicated.

use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set, TransactionTrait};
use tracing::info;

use entity::{external_identity, user};

use crate::config::Config;
use crate::crypto;
use crate::error::AppError;
use crate::registration::find_user_by_email;
use crate::util::{generate_salt, hex_encode, now_ts, random_bytes, uuid_v4};
use crate::validate::normalize_email;

async fn link(
    db: &impl ConnectionTrait,
    user_id: &str,
    provider: &str,
    provider_account_id: &str,
) -> Result<(), AppError> {
    external_identity::ActiveModel {
        provider: Set(provider.to_string()),
        provider_account_id: Set(provider_account_id.to_string()),
        user_id: Set(user_id.to_string()),
        created_at: Set(now_ts()),
    }
    .insert(db)
    .await?;
    Ok(())
}

/// Attach an external identity to an existing account.
///
/// A repeat call with the same (provider, provider_account_id) pair is a
/// no-op when it already points at `user_id`, and an error when it is bound
/// to a different account.
pub async fn link_external_identity(
    db: &impl ConnectionTrait,
    user_id: &str,
    provider: &str,
    provider_account_id: &str,
) -> Result<(), AppError> {
    let existing = external_identity::Entity::find_by_id((
        provider.to_string(),
        provider_account_id.to_string(),
    ))
    .one(db)
    .await?;

    match existing {
        Some(identity) if identity.user_id == user_id => Ok(()),
        Some(_) => Err(AppError::Validation(
            "This external identity is linked to another account".into(),
        )),
        None => link(db, user_id, provider, provider_account_id).await,
    }
}

/// Resolve an OAuth callback to an account, creating or linking as needed.
///
/// Mirrors the provider sign-in semantics of the credentials flow's sibling:
/// an already-linked identity resolves directly; an existing account with the
/// same email gets the identity attached; otherwise a verified account is
/// created with an unguessable random password (the provider has already
/// proven email ownership).
pub async fn find_or_create_linked_account(
    db: &(impl ConnectionTrait + TransactionTrait),
    config: &Config,
    provider: &str,
    provider_account_id: &str,
    email: &str,
    full_name: &str,
    image: Option<&str>,
) -> Result<user::Model, AppError> {
    let email = normalize_email(email)?;

    if let Some(identity) = external_identity::Entity::find_by_id((
        provider.to_string(),
        provider_account_id.to_string(),
    ))
    .one(db)
    .await?
    {
        return user::Entity::find_by_id(identity.user_id)
            .one(db)
            .await?
            .ok_or(AppError::NotFound);
    }

    let txn = db.begin().await?;

    let account = match find_user_by_email(&txn, &email).await? {
        Some(existing) => existing,
        None => {
            let now = now_ts();
            let salt = generate_salt();
            let iterations = config.password_iterations;
            let random_password = hex_encode(&random_bytes(32));
            let password_hash = crypto::hash_password_blocking(
                random_password.into_bytes(),
                salt.clone(),
                iterations,
            )
            .await;

            user::ActiveModel {
                id: Set(uuid_v4()),
                email: Set(email.clone()),
                full_name: Set(full_name.to_string()),
                password_hash: Set(password_hash),
                salt: Set(salt),
                password_iterations: Set(iterations as i32),
                verified_at: Set(Some(now)),
                image: Set(image.map(|s| s.to_string())),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?
        }
    };

    link(&txn, &account.id, provider, provider_account_id).await?;
    txn.commit().await?;

    info!("Linked {provider} identity to {email}");
    Ok(account)
}
