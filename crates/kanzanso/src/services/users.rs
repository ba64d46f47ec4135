//! Registration, login and account management.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::auth::{self, TokenService};
use crate::error::{Error, Result};
use crate::models::{new_id, LoginRequest, LoginResponse, NewUser, User, UserUpdate, UserView};
use crate::storage::Storage;

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Look up a user by email, ignoring case.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn find_by_email(storage: &Storage, email: &str) -> Result<Option<User>> {
    storage.find_one_by_field::<User>(None, "email", &normalize_email(email))
}

/// Whether an account exists for `email`.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn exists(storage: &Storage, email: &str) -> Result<bool> {
    Ok(find_by_email(storage, email)?.is_some())
}

/// Register a new account.
///
/// # Errors
///
/// Returns a validation error for bad input, [`Error::BadRequest`] if the
/// email is taken, or a storage error.
pub fn register(storage: &Storage, new_user: &NewUser) -> Result<User> {
    register_with_id(storage, new_id(), new_user, Utc::now())
}

/// Register with a fixed id, as done for the demo account.
///
/// # Errors
///
/// See [`register`].
pub fn register_with_id(
    storage: &Storage,
    id: String,
    new_user: &NewUser,
    now: DateTime<Utc>,
) -> Result<User> {
    new_user.validate()?;
    if exists(storage, &new_user.email)? {
        return Err(Error::bad_request("email is already registered"));
    }

    let password_hash = auth::hash_password(&new_user.password)?;
    let user = User {
        id,
        name: new_user.name.trim().to_string(),
        email: normalize_email(&new_user.email),
        password_hash,
        created_at: now,
        updated_at: now,
    };
    storage.save(&user)?;
    info!(user_id = %user.id, "user registered");
    Ok(user)
}

/// Check credentials and issue a token.
///
/// # Errors
///
/// Returns [`Error::Unauthorized`] for unknown emails and wrong passwords.
pub fn login(storage: &Storage, tokens: &TokenService, request: &LoginRequest) -> Result<LoginResponse> {
    request.validate()?;
    let user = find_by_email(storage, &request.email)?
        .filter(|u| auth::verify_password(&request.password, &u.password_hash))
        .ok_or_else(|| Error::unauthorized("invalid email or password"))?;

    let token = tokens.issue(&user.id, &user.email)?;
    debug!(user_id = %user.id, "user logged in");
    Ok(LoginResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        token,
    })
}

/// Load a user by id.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if there is no such user.
pub fn get(storage: &Storage, id: &str) -> Result<User> {
    super::existing(storage, id, "user")
}

/// All accounts.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn list(storage: &Storage) -> Result<Vec<UserView>> {
    Ok(storage.list::<User>()?.iter().map(UserView::from).collect())
}

/// Change name, email or password.
///
/// # Errors
///
/// Returns a validation error for bad input, [`Error::BadRequest`] if the
/// new email is taken by another account, or [`Error::NotFound`].
pub fn update(storage: &Storage, id: &str, update: &UserUpdate) -> Result<User> {
    update.validate()?;
    let mut user = get(storage, id)?;

    if let Some(name) = &update.name {
        user.name = name.trim().to_string();
    }
    if let Some(email) = &update.email {
        let email = normalize_email(email);
        if email != user.email {
            if exists(storage, &email)? {
                return Err(Error::bad_request("email is already registered"));
            }
            user.email = email;
        }
    }
    if let Some(password) = &update.password {
        user.password_hash = auth::hash_password(password)?;
    }
    user.updated_at = Utc::now();

    storage.save(&user)?;
    info!(user_id = %user.id, "user updated");
    Ok(user)
}

/// Delete an account and everything it owns.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if there is no such user.
pub fn delete(storage: &Storage, id: &str) -> Result<()> {
    get(storage, id)?;
    let removed = storage.delete_owned_by(id)?;
    info!(user_id = %id, documents = removed, "user deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MoodEntry;
    use chrono::Duration;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ada".to_string(),
            email: email.to_string(),
            password: "password123".to_string(),
        }
    }

    fn tokens() -> TokenService {
        TokenService::new(b"0123456789abcdef0123456789abcdef", Duration::hours(1))
    }

    #[test]
    fn test_register_normalizes_email() {
        let storage = Storage::open_in_memory().unwrap();
        let user = register(&storage, &new_user("Ada@Example.com")).unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_ne!(user.password_hash, "password123");
        assert!(exists(&storage, "ADA@example.com").unwrap());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let storage = Storage::open_in_memory().unwrap();
        register(&storage, &new_user("ada@example.com")).unwrap();
        let err = register(&storage, &new_user("ADA@example.com")).unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[test]
    fn test_login() {
        let storage = Storage::open_in_memory().unwrap();
        let tokens = tokens();
        let user = register(&storage, &new_user("ada@example.com")).unwrap();

        let ok = login(
            &storage,
            &tokens,
            &LoginRequest {
                email: "ada@example.com".to_string(),
                password: "password123".to_string(),
            },
        )
        .unwrap();
        assert_eq!(ok.id, user.id);
        assert_eq!(tokens.resolve(&ok.token).unwrap(), user.id);

        let bad = login(
            &storage,
            &tokens,
            &LoginRequest {
                email: "ada@example.com".to_string(),
                password: "wrong-password".to_string(),
            },
        );
        assert!(matches!(bad, Err(Error::Unauthorized(_))));

        let unknown = login(
            &storage,
            &tokens,
            &LoginRequest {
                email: "bob@example.com".to_string(),
                password: "password123".to_string(),
            },
        );
        assert!(matches!(unknown, Err(Error::Unauthorized(_))));
    }

    #[test]
    fn test_update_email_conflict() {
        let storage = Storage::open_in_memory().unwrap();
        let ada = register(&storage, &new_user("ada@example.com")).unwrap();
        register(&storage, &new_user("bob@example.com")).unwrap();

        let taken = UserUpdate {
            email: Some("bob@example.com".to_string()),
            ..UserUpdate::default()
        };
        assert!(matches!(
            update(&storage, &ada.id, &taken),
            Err(Error::BadRequest(_))
        ));

        // Re-submitting one's own email is fine
        let same = UserUpdate {
            email: Some("ADA@example.com".to_string()),
            name: Some("Ada L.".to_string()),
            ..UserUpdate::default()
        };
        let updated = update(&storage, &ada.id, &same).unwrap();
        assert_eq!(updated.name, "Ada L.");
    }

    #[test]
    fn test_password_change() {
        let storage = Storage::open_in_memory().unwrap();
        let tokens = tokens();
        let ada = register(&storage, &new_user("ada@example.com")).unwrap();
        let change = UserUpdate {
            password: Some("new-password".to_string()),
            ..UserUpdate::default()
        };
        update(&storage, &ada.id, &change).unwrap();

        let request = LoginRequest {
            email: "ada@example.com".to_string(),
            password: "new-password".to_string(),
        };
        assert!(login(&storage, &tokens, &request).is_ok());
    }

    #[test]
    fn test_delete_cascades() {
        let storage = Storage::open_in_memory().unwrap();
        let ada = register(&storage, &new_user("ada@example.com")).unwrap();
        storage
            .save(&MoodEntry {
                id: "m1".to_string(),
                user_id: ada.id.clone(),
                mood: "happy".to_string(),
                note: None,
                date: Utc::now(),
            })
            .unwrap();

        delete(&storage, &ada.id).unwrap();
        assert!(get(&storage, &ada.id).unwrap_err().is_not_found());
        assert!(storage.get::<MoodEntry>("m1").unwrap().is_none());
        assert!(delete(&storage, &ada.id).unwrap_err().is_not_found());
    }
}
