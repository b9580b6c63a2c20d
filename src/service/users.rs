use chrono::Utc;

use crate::auth::{PasswordVault, TokenService};
use crate::error::{AuthFailure, Error, Result};
use crate::store::{Store, Tx, transaction};
use crate::types::{NewUser, User};

const EMAIL_TAKEN: &str = "Email already registered";

pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Fields present replace the stored values; absent ones are kept.
#[derive(Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

pub struct Session {
    pub token: String,
    pub user_id: i64,
}

fn email_taken(err: Error) -> Error {
    match err {
        Error::AlreadyExists => Error::Conflict(EMAIL_TAKEN.to_string()),
        other => other,
    }
}

fn ensure_subject(viewer: i64, user_id: i64) -> Result<()> {
    if viewer != user_id {
        tracing::warn!("User {viewer} refused access to user {user_id}");
        return Err(Error::Forbidden);
    }
    Ok(())
}

fn load(tx: &dyn Tx, user_id: i64) -> Result<User> {
    tx.get_user(user_id)?.ok_or(Error::NotFound)
}

pub fn register(store: &dyn Store, vault: &PasswordVault, input: Registration) -> Result<User> {
    let password_hash = vault.hash(&input.password)?;

    let user = transaction(store, |tx| {
        if tx.get_user_by_email(&input.email)?.is_some() {
            return Err(Error::Conflict(EMAIL_TAKEN.to_string()));
        }

        tx.create_user(&NewUser {
            username: input.username,
            email: input.email,
            password_hash,
            registered_at: super::now(),
        })
        .map_err(email_taken)
    })?;

    tracing::info!("Registered user {}", user.id);
    Ok(user)
}

/// Checks credentials and issues a token. An unknown email and a wrong
/// password fail identically.
pub fn login(
    store: &dyn Store,
    vault: &PasswordVault,
    tokens: &TokenService,
    email: &str,
    password: &str,
) -> Result<Session> {
    let user = transaction(store, |tx| tx.get_user_by_email(email))?;

    let stored = user.as_ref().map(|user| user.password_hash.as_str());
    let verified = vault.verify_or_decoy(password, stored)?;
    let user = match user {
        Some(user) if verified => user,
        _ => {
            tracing::warn!("Failed login attempt");
            return Err(AuthFailure::BadCredentials.into());
        }
    };

    let token = tokens.issue(user.id, Utc::now())?;
    tracing::info!("User {} logged in", user.id);

    Ok(Session {
        token,
        user_id: user.id,
    })
}

pub fn get(store: &dyn Store, viewer: i64, user_id: i64) -> Result<User> {
    ensure_subject(viewer, user_id)?;
    transaction(store, |tx| load(tx, user_id))
}

/// The users the caller may see, which by the ownership rule is only itself.
pub fn list_visible(store: &dyn Store, viewer: i64) -> Result<Vec<User>> {
    transaction(store, |tx| Ok(tx.get_user(viewer)?.into_iter().collect()))
}

pub fn update(
    store: &dyn Store,
    vault: &PasswordVault,
    viewer: i64,
    user_id: i64,
    patch: UserPatch,
) -> Result<User> {
    ensure_subject(viewer, user_id)?;

    let password_hash = patch
        .password
        .as_deref()
        .map(|password| vault.hash(password))
        .transpose()?;

    let user = transaction(store, |tx| {
        let mut user = load(tx, user_id)?;

        if let Some(email) = patch.email {
            if email != user.email {
                if tx.get_user_by_email(&email)?.is_some() {
                    return Err(Error::Conflict(EMAIL_TAKEN.to_string()));
                }
                user.email = email;
            }
        }
        if let Some(username) = patch.username {
            user.username = username;
        }
        if let Some(password_hash) = password_hash {
            user.password_hash = password_hash;
        }

        tx.update_user(&user).map_err(email_taken)
    })?;

    tracing::info!("Updated user {user_id}");
    Ok(user)
}

/// Removes the user together with everything it owns.
pub fn delete(store: &dyn Store, viewer: i64, user_id: i64) -> Result<()> {
    ensure_subject(viewer, user_id)?;

    transaction(store, |tx| {
        if !tx.delete_user(user_id)? {
            return Err(Error::NotFound);
        }
        Ok(())
    })?;

    tracing::info!("Deleted user {user_id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::{register as register_user, store, vault};
    use chrono::Duration;

    fn tokens() -> TokenService {
        TokenService::new(b"service-test-secret", Duration::minutes(15))
    }

    #[test]
    fn test_register_hashes_password() {
        let store = store();
        let vault = vault();
        let user = register_user(store.as_ref(), &vault, "alice");

        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@example.com");
        assert_ne!(user.password_hash, "secure123");
        assert!(vault.verify("secure123", &user.password_hash).unwrap());
    }

    #[test]
    fn test_duplicate_email_conflicts() {
        let store = store();
        let vault = vault();
        register_user(store.as_ref(), &vault, "alice");

        let result = register(
            store.as_ref(),
            &vault,
            Registration {
                username: "other".to_string(),
                email: "alice@example.com".to_string(),
                password: "secure123".to_string(),
            },
        );
        match result {
            Err(Error::Conflict(message)) => assert!(message.contains("already")),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_distinct_emails_all_register() {
        let store = store();
        let vault = vault();
        let ids: Vec<i64> = ["a", "b", "c", "d"]
            .iter()
            .map(|name| register_user(store.as_ref(), &vault, name).id)
            .collect();

        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_login_issues_verifiable_token() {
        let store = store();
        let vault = vault();
        let tokens = tokens();
        let user = register_user(store.as_ref(), &vault, "alice");

        let session = login(store.as_ref(), &vault, &tokens, "alice@example.com", "secure123").unwrap();
        assert_eq!(session.user_id, user.id);
        assert_eq!(tokens.verify(&session.token, Utc::now()).unwrap(), user.id);
    }

    #[test]
    fn test_login_failures_are_indistinguishable() {
        let store = store();
        let vault = vault();
        let tokens = tokens();
        register_user(store.as_ref(), &vault, "alice");

        let wrong_password = login(store.as_ref(), &vault, &tokens, "alice@example.com", "wrong");
        let unknown_email = login(store.as_ref(), &vault, &tokens, "nobody@example.com", "secure123");

        assert!(matches!(wrong_password, Err(Error::Auth(AuthFailure::BadCredentials))));
        assert!(matches!(unknown_email, Err(Error::Auth(AuthFailure::BadCredentials))));
    }

    #[test]
    fn test_unknown_email_still_runs_verifier() {
        let store = store();
        let vault = vault();
        let tokens = tokens();

        let result = login(store.as_ref(), &vault, &tokens, "nobody@example.com", "secure123");
        assert!(matches!(result, Err(Error::Auth(AuthFailure::BadCredentials))));
        assert!(vault.decoy_used());
    }

    #[test]
    fn test_only_subject_reads_record() {
        let store = store();
        let vault = vault();
        let alice = register_user(store.as_ref(), &vault, "alice");
        let bob = register_user(store.as_ref(), &vault, "bob");

        assert_eq!(get(store.as_ref(), alice.id, alice.id).unwrap().email, alice.email);
        assert!(matches!(get(store.as_ref(), bob.id, alice.id), Err(Error::Forbidden)));
    }

    #[test]
    fn test_update_applies_present_fields() {
        let store = store();
        let vault = vault();
        let alice = register_user(store.as_ref(), &vault, "alice");

        let updated = update(
            store.as_ref(),
            &vault,
            alice.id,
            alice.id,
            UserPatch {
                username: Some("alicia".to_string()),
                password: Some("changed456".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(updated.username, "alicia");
        assert_eq!(updated.email, "alice@example.com");
        assert!(vault.verify("changed456", &updated.password_hash).unwrap());

        let stored = get(store.as_ref(), alice.id, alice.id).unwrap();
        assert_eq!(stored.username, "alicia");
    }

    #[test]
    fn test_update_to_taken_email_conflicts() {
        let store = store();
        let vault = vault();
        let alice = register_user(store.as_ref(), &vault, "alice");
        register_user(store.as_ref(), &vault, "bob");

        let result = update(
            store.as_ref(),
            &vault,
            alice.id,
            alice.id,
            UserPatch {
                email: Some("bob@example.com".to_string()),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(Error::Conflict(_))));
    }

    #[test]
    fn test_update_other_user_forbidden() {
        let store = store();
        let vault = vault();
        let alice = register_user(store.as_ref(), &vault, "alice");
        let bob = register_user(store.as_ref(), &vault, "bob");

        let result = update(store.as_ref(), &vault, bob.id, alice.id, UserPatch::default());
        assert!(matches!(result, Err(Error::Forbidden)));
    }

    #[test]
    fn test_delete_is_subject_only() {
        let store = store();
        let vault = vault();
        let alice = register_user(store.as_ref(), &vault, "alice");
        let bob = register_user(store.as_ref(), &vault, "bob");

        assert!(matches!(delete(store.as_ref(), bob.id, alice.id), Err(Error::Forbidden)));
        delete(store.as_ref(), alice.id, alice.id).unwrap();
        assert!(matches!(get(store.as_ref(), alice.id, alice.id), Err(Error::NotFound)));
    }

    #[test]
    fn test_list_visible_is_only_self() {
        let store = store();
        let vault = vault();
        let alice = register_user(store.as_ref(), &vault, "alice");
        register_user(store.as_ref(), &vault, "bob");

        let visible = list_visible(store.as_ref(), alice.id).unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, alice.id);
    }
}
