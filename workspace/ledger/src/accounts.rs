//! Staff accounts and sign-in. Passwords are kept as Argon2id PHC strings.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use common::{CreateUserRequest, LoginRequest, UserDto};
use model::entities::user;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, Set};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::error::{LedgerError, Result, is_unique_violation};

const INVALID_CREDENTIALS: &str = "Invalid user ID or password";

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| LedgerError::validation(format!("Failed to hash password: {e}")))
}

/// False for a mismatch and for a stored hash that does not parse.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!("Stored password hash is malformed: {}", e);
            false
        }
    }
}

fn to_dto(model: user::Model) -> UserDto {
    UserDto {
        user_id: model.user_id,
        user_first_name: model.user_first_name,
        user_last_name: model.user_last_name,
        role_id: model.role_id,
    }
}

#[instrument(skip(conn, request), fields(user_id = %request.user_id))]
pub async fn login<C: ConnectionTrait>(conn: &C, request: LoginRequest) -> Result<UserDto> {
    request.validate()?;
    let found = user::Entity::find_by_id(request.user_id.trim().to_string())
        .one(conn)
        .await?;

    match found {
        Some(account) if verify_password(&request.password, &account.password_hash) => {
            info!("User {} signed in", account.user_id);
            Ok(to_dto(account))
        }
        _ => {
            warn!("Rejected sign-in for {}", request.user_id);
            Err(LedgerError::Unauthorized(INVALID_CREDENTIALS.to_string()))
        }
    }
}

#[instrument(skip(conn, request), fields(user_id = %request.user_id))]
pub async fn create_user<C: ConnectionTrait>(
    conn: &C,
    request: CreateUserRequest,
) -> Result<UserDto> {
    request.validate()?;
    let user_id = request.user_id.trim().to_string();

    if user::Entity::find_by_id(user_id.clone()).one(conn).await?.is_some() {
        return Err(LedgerError::Conflict(format!("User ID '{}' already exists", user_id)));
    }

    let created = user::ActiveModel {
        user_id: Set(user_id.clone()),
        user_first_name: Set(request.user_first_name.trim().to_string()),
        user_last_name: Set(request.user_last_name.trim().to_string()),
        password_hash: Set(hash_password(&request.password)?),
        role_id: Set(request.role_id),
    }
    .insert(conn)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            LedgerError::Conflict(format!("User ID '{}' already exists", user_id))
        } else {
            LedgerError::from(err)
        }
    })?;

    info!("Created user {}", created.user_id);
    Ok(to_dto(created))
}

pub async fn list_users<C: ConnectionTrait>(conn: &C) -> Result<Vec<UserDto>> {
    Ok(user::Entity::find()
        .order_by_asc(user::Column::UserId)
        .all(conn)
        .await?
        .into_iter()
        .map(to_dto)
        .collect())
}

pub async fn get_user<C: ConnectionTrait>(conn: &C, user_id: &str) -> Result<UserDto> {
    user::Entity::find_by_id(user_id.to_string())
        .one(conn)
        .await?
        .map(to_dto)
        .ok_or_else(|| LedgerError::not_found(format!("User {} not found", user_id)))
}

pub async fn delete_user<C: ConnectionTrait>(conn: &C, user_id: &str) -> Result<()> {
    let result = user::Entity::delete_by_id(user_id.to_string()).exec(conn).await?;
    if result.rows_affected == 0 {
        return Err(LedgerError::not_found(format!("User {} not found", user_id)));
    }
    info!("Deleted user {}", user_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::setup_db;

    fn new_user(id: &str, password: &str) -> CreateUserRequest {
        CreateUserRequest {
            user_id: id.to_string(),
            user_first_name: "Maria".to_string(),
            user_last_name: "Santos".to_string(),
            password: password.to_string(),
            role_id: None,
        }
    }

    fn credentials(id: &str, password: &str) -> LoginRequest {
        LoginRequest {
            user_id: id.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("cashier-pass").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("cashier-pass", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("cashier-pass", "not-a-hash"));
    }

    #[tokio::test]
    async fn test_login_round() {
        let db = setup_db().await.unwrap();
        let created = create_user(&db, new_user("admin", "secret1")).await.unwrap();
        assert_eq!(created.user_first_name, "Maria");

        let signed_in = login(&db, credentials("admin", "secret1")).await.unwrap();
        assert_eq!(signed_in.user_id, "admin");

        for (id, password) in [("admin", "nope"), ("ghost", "secret1")] {
            match login(&db, credentials(id, password)).await {
                Err(LedgerError::Unauthorized(message)) => assert_eq!(message, INVALID_CREDENTIALS),
                other => panic!("expected unauthorized, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_duplicate_user_conflicts() {
        let db = setup_db().await.unwrap();
        create_user(&db, new_user("admin", "secret1")).await.unwrap();
        assert!(matches!(
            create_user(&db, new_user("admin", "secret2")).await.unwrap_err(),
            LedgerError::Conflict(_)
        ));
        assert!(matches!(
            create_user(&db, new_user("short", "123")).await.unwrap_err(),
            LedgerError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let db = setup_db().await.unwrap();
        create_user(&db, new_user("admin", "secret1")).await.unwrap();
        assert_eq!(list_users(&db).await.unwrap().len(), 1);
        delete_user(&db, "admin").await.unwrap();
        assert!(matches!(get_user(&db, "admin").await.unwrap_err(), LedgerError::NotFound(_)));
        assert!(matches!(delete_user(&db, "admin").await.unwrap_err(), LedgerError::NotFound(_)));
    }
}
