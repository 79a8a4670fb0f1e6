//! Registration and email-verification workflow.
//!
//! State machine: Anonymous -> PendingVerification -> Verified, with no
//! backward transitions. Account creation is deferred until redemption: the
//! `pending_registrations` row carries the whole signup payload alongside the
//! secret, so the `users` table never accumulates unverified rows. Issuing a
//! new secret for an email supersedes (deletes) any prior one; redemption
//! consumes the row atomically inside the promotion transaction so a secret
//! can be redeemed at most once.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, Set, TransactionTrait,
};
use tracing::{debug, info, warn};

use entity::{pending_registration, user};

use crate::config::Config;
use crate::crypto;
use crate::error::AppError;
use crate::mail::{verification_email_html, verification_email_subject, Mailer};
use crate::util::{generate_salt, generate_verification_token, now_ts, uuid_v4};
use crate::validate::{normalize_email, validate_full_name, validate_password};

pub(crate) async fn find_user_by_email(
    db: &impl ConnectionTrait,
    email: &str,
) -> Result<Option<user::Model>, AppError> {
    Ok(user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?)
}

async fn find_pending_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<pending_registration::Model>, AppError> {
    Ok(pending_registration::Entity::find()
        .filter(pending_registration::Column::Email.eq(email))
        .one(db)
        .await?)
}

/// Persist a fresh secret for `email`, superseding any prior one.
///
/// The delete-then-insert runs in one transaction so concurrent issues for
/// the same email never leave two live rows behind.
async fn issue(
    db: &DatabaseConnection,
    email: &str,
    full_name: &str,
    password_hash: Vec<u8>,
    salt: Vec<u8>,
    iterations: i32,
    ttl_secs: i64,
) -> Result<String, AppError> {
    let token = generate_verification_token();
    let now = now_ts();

    let txn = db.begin().await?;

    pending_registration::Entity::delete_many()
        .filter(pending_registration::Column::Email.eq(email))
        .exec(&txn)
        .await?;

    pending_registration::ActiveModel {
        token: Set(token.clone()),
        email: Set(email.to_string()),
        full_name: Set(full_name.to_string()),
        password_hash: Set(password_hash),
        salt: Set(salt),
        password_iterations: Set(iterations),
        created_at: Set(now),
        expires_at: Set(now + ttl_secs),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    Ok(token)
}

/// Undo an issued-but-undelivered secret so the caller can retry cleanly.
async fn retract(db: &DatabaseConnection, token: &str) -> Result<(), AppError> {
    pending_registration::Entity::delete_by_id(token)
        .exec(db)
        .await?;
    Ok(())
}

async fn dispatch(
    db: &DatabaseConnection,
    mailer: &dyn Mailer,
    config: &Config,
    email: &str,
    full_name: &str,
    token: &str,
) -> Result<(), AppError> {
    let link = config.verification_link(token);
    let html = verification_email_html(&link, config.verification_ttl_secs);

    if let Err(e) = mailer
        .send(email, Some(full_name), verification_email_subject(), html)
        .await
    {
        warn!("Verification email to {email} failed: {e}");
        // A secret the user never received is worse than no secret at all.
        retract(db, token).await?;
        return Err(AppError::DeliveryFailed);
    }

    Ok(())
}

/// Anonymous -> PendingVerification.
///
/// Validates and normalizes the payload, hashes the password, stores the
/// pending row, and dispatches the verification link. Fails with
/// `AlreadyRegistered` when the email already belongs to a verified account;
/// re-registering a still-pending email supersedes the earlier secret.
pub async fn register(
    db: &DatabaseConnection,
    mailer: &dyn Mailer,
    config: &Config,
    email: &str,
    password: &str,
    full_name: &str,
) -> Result<(), AppError> {
    let email = normalize_email(email)?;
    validate_password(password)?;
    let full_name = validate_full_name(full_name)?;

    if let Some(existing) = find_user_by_email(db, &email).await? {
        if existing.verified_at.is_some() {
            debug!("Registration rejected, {email} already verified");
            return Err(AppError::AlreadyRegistered);
        }
    }

    let salt = generate_salt();
    let iterations = config.password_iterations;
    let password_hash =
        crypto::hash_password_blocking(password.as_bytes().to_vec(), salt.clone(), iterations)
            .await;

    let token = issue(
        db,
        &email,
        &full_name,
        password_hash,
        salt,
        iterations as i32,
        config.verification_ttl_secs,
    )
    .await?;

    dispatch(db, mailer, config, &email, &full_name, &token).await?;

    info!("Registration pending for {email}, verification email sent");
    Ok(())
}

/// Re-issue and re-dispatch the secret for an existing pending registration.
///
/// The prior secret becomes invalid immediately even though its TTL has not
/// elapsed. Leaks whether the email exists; accepted, see error taxonomy.
pub async fn resend(
    db: &DatabaseConnection,
    mailer: &dyn Mailer,
    config: &Config,
    email: &str,
) -> Result<(), AppError> {
    let email = normalize_email(email)?;

    if let Some(existing) = find_user_by_email(db, &email).await? {
        if existing.verified_at.is_some() {
            return Err(AppError::AlreadyRegistered);
        }
    }

    let Some(pending) = find_pending_by_email(db, &email).await? else {
        return Err(AppError::NotFound);
    };

    let full_name = pending.full_name.clone();
    let token = issue(
        db,
        &email,
        &full_name,
        pending.password_hash,
        pending.salt,
        pending.password_iterations,
        config.verification_ttl_secs,
    )
    .await?;

    dispatch(db, mailer, config, &email, &full_name, &token).await?;

    info!("Verification email re-sent to {email}");
    Ok(())
}

/// Consume the pending row and promote it to a verified account, atomically.
///
/// The delete is the linearization point: of two concurrent redemptions of
/// the same secret, exactly one observes `rows_affected == 1` and commits;
/// the other sees the row gone and reports `NotFound`.
async fn consume_and_promote(
    db: &DatabaseConnection,
    pending: pending_registration::Model,
) -> Result<user::Model, AppError> {
    let txn = db.begin().await?;

    let deleted = pending_registration::Entity::delete_by_id(&pending.token)
        .exec(&txn)
        .await?;
    if deleted.rows_affected == 0 {
        txn.rollback().await?;
        return Err(AppError::NotFound);
    }

    let now = now_ts();
    let promoted = match find_user_by_email(&txn, &pending.email).await? {
        Some(existing) if existing.verified_at.is_some() => {
            txn.rollback().await?;
            return Err(AppError::AlreadyVerified);
        }
        Some(existing) => {
            let mut active: user::ActiveModel = existing.into();
            active.full_name = Set(pending.full_name);
            active.password_hash = Set(pending.password_hash);
            active.salt = Set(pending.salt);
            active.password_iterations = Set(pending.password_iterations);
            active.verified_at = Set(Some(now));
            active.updated_at = Set(now);
            active.update(&txn).await?
        }
        None => {
            user::ActiveModel {
                id: Set(uuid_v4()),
                email: Set(pending.email),
                full_name: Set(pending.full_name),
                password_hash: Set(pending.password_hash),
                salt: Set(pending.salt),
                password_iterations: Set(pending.password_iterations),
                verified_at: Set(Some(now)),
                image: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?
        }
    };

    txn.commit().await?;

    info!("Account {} verified", promoted.email);
    Ok(promoted)
}

/// Expiry is enforced lazily: a dead row found at redemption time is removed
/// on the spot so the same secret cannot be presented again.
async fn reject_if_expired(
    db: &DatabaseConnection,
    pending: &pending_registration::Model,
) -> Result<(), AppError> {
    if now_ts() <= pending.expires_at {
        return Ok(());
    }

    debug!("Pending registration for {} expired", pending.email);
    pending.clone().delete(db).await?;
    Err(AppError::Expired)
}

/// PendingVerification -> Verified, keyed by (email, presented secret).
pub async fn redeem(
    db: &DatabaseConnection,
    email: &str,
    presented: &str,
) -> Result<user::Model, AppError> {
    let email = normalize_email(email)?;

    let Some(pending) = find_pending_by_email(db, &email).await? else {
        return Err(AppError::NotFound);
    };

    if !crypto::secrets_match(presented, &pending.token) {
        debug!("Verification mismatch for {email}");
        return Err(AppError::Mismatch);
    }

    reject_if_expired(db, &pending).await?;

    consume_and_promote(db, pending).await
}

/// PendingVerification -> Verified, keyed by the secret alone (link flow).
pub async fn redeem_by_token(
    db: &DatabaseConnection,
    token: &str,
) -> Result<user::Model, AppError> {
    let Some(pending) = pending_registration::Entity::find_by_id(token.trim())
        .one(db)
        .await?
    else {
        return Err(AppError::NotFound);
    };

    reject_if_expired(db, &pending).await?;

    if let Some(existing) = find_user_by_email(db, &pending.email).await? {
        if existing.verified_at.is_some() {
            return Err(AppError::AlreadyVerified);
        }
    }

    consume_and_promote(db, pending).await
}
