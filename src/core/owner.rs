//! Owner registry and identity resolution.
//!
//! The identity carried on a request is an opaque key (an email address).
//! Resolving it is the only place that produces [`Error::Unauthorized`]; the
//! resolved owner id is then passed explicitly to every other operation.

use crate::{
    config::settings::OwnerSeed,
    entities::{Owner, owner},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use tracing::info;

/// Registers a new owner under `email`.
///
/// The email is trimmed and must not be empty. Registering an email twice
/// fails with [`Error::DuplicateKey`].
pub async fn register_owner(
    db: &DatabaseConnection,
    email: &str,
    display_name: &str,
) -> Result<owner::Model> {
    let email = super::normalize_name("Email", email)?;

    if get_owner_by_email(db, &email).await?.is_some() {
        return Err(Error::duplicate("Owner", email));
    }

    let owner = owner::ActiveModel {
        email: Set(email),
        display_name: Set(display_name.trim().to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = owner.insert(db).await?;
    info!(owner_id = result.id, "Registered owner");
    Ok(result)
}

/// Finds an owner by identity key.
pub async fn get_owner_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<owner::Model>> {
    Owner::find()
        .filter(owner::Column::Email.eq(email))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Turns the identity carried on a request into an owner.
///
/// A missing, blank or unknown identity is [`Error::Unauthorized`].
pub async fn resolve_owner(
    db: &DatabaseConnection,
    identity: Option<&str>,
) -> Result<owner::Model> {
    let Some(email) = identity.map(str::trim).filter(|e| !e.is_empty()) else {
        return Err(Error::Unauthorized);
    };

    get_owner_by_email(db, email)
        .await?
        .ok_or(Error::Unauthorized)
}

/// Registers every seed whose email is not taken yet. Returns how many were added.
pub async fn seed_owners(db: &DatabaseConnection, seeds: &[OwnerSeed]) -> Result<usize> {
    let mut added = 0;
    for seed in seeds {
        if get_owner_by_email(db, seed.email.trim()).await?.is_none() {
            register_owner(db, &seed.email, &seed.display_name).await?;
            added += 1;
        }
    }
    Ok(added)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_register_and_resolve() -> Result<()> {
        let db = setup_test_db().await?;

        let owner = register_owner(&db, "  ayse@example.com ", "Ayse").await?;
        assert_eq!(owner.email, "ayse@example.com");
        assert_eq!(owner.display_name, "Ayse");

        let resolved = resolve_owner(&db, Some("ayse@example.com")).await?;
        assert_eq!(resolved.id, owner.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_register_duplicate_email() -> Result<()> {
        let db = setup_test_db().await?;
        register_owner(&db, "ayse@example.com", "Ayse").await?;

        let result = register_owner(&db, "ayse@example.com", "Other").await;
        assert!(matches!(result, Err(Error::DuplicateKey { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_register_empty_email() -> Result<()> {
        let db = setup_test_db().await?;
        let result = register_owner(&db, "  ", "Nobody").await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_resolve_missing_or_unknown_identity() -> Result<()> {
        let db = setup_test_db().await?;
        register_owner(&db, "ayse@example.com", "Ayse").await?;

        assert!(matches!(
            resolve_owner(&db, None).await,
            Err(Error::Unauthorized)
        ));
        assert!(matches!(
            resolve_owner(&db, Some("")).await,
            Err(Error::Unauthorized)
        ));
        assert!(matches!(
            resolve_owner(&db, Some("mehmet@example.com")).await,
            Err(Error::Unauthorized)
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_owners_skips_existing() -> Result<()> {
        let db = setup_test_db().await?;
        register_owner(&db, "ayse@example.com", "Ayse").await?;

        let seeds = vec![
            OwnerSeed {
                email: "ayse@example.com".to_string(),
                display_name: "Ayse".to_string(),
            },
            OwnerSeed {
                email: "mehmet@example.com".to_string(),
                display_name: "Mehmet".to_string(),
            },
        ];

        assert_eq!(seed_owners(&db, &seeds).await?, 1);
        assert_eq!(seed_owners(&db, &seeds).await?, 0);
        assert!(get_owner_by_email(&db, "mehmet@example.com").await?.is_some());

        Ok(())
    }
}
