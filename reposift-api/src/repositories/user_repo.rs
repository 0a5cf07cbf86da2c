use sqlx::PgPool;

use crate::domain::User;

use super::repo_error::RepositoryError;

pub trait UserRepository {
    async fn get_user(&self, id: i32) -> Result<User, RepositoryError>;
    async fn upsert_user(&self, user: &NewUser) -> Result<User, RepositoryError>;
    async fn update_display_name(
        &self,
        id: i32,
        display_name: &str,
    ) -> Result<User, RepositoryError>;
}

#[derive(Clone)]
pub struct UserRepositoryImpl {
    pool: PgPool,
}

impl UserRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for UserRepositoryImpl {
    async fn get_user(&self, id: i32) -> Result<User, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, handle, display_name, avatar_url, access_token, role
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::from)
            .ok_or_else(|| RepositoryError::NotFound(format!("user {id}")))
    }

    async fn upsert_user(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (handle, display_name, avatar_url, access_token)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (handle) DO UPDATE
            SET display_name = EXCLUDED.display_name,
                avatar_url = EXCLUDED.avatar_url,
                access_token = EXCLUDED.access_token
            RETURNING id, handle, display_name, avatar_url, access_token, role
            "#,
        )
        .bind(&user.handle)
        .bind(&user.display_name)
        .bind(&user.avatar_url)
        .bind(&user.access_token)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update_display_name(
        &self,
        id: i32,
        display_name: &str,
    ) -> Result<User, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            UPDATE users
            SET display_name = $2
            WHERE id = $1
            RETURNING id, handle, display_name, avatar_url, access_token, role
            "#,
        )
        .bind(id)
        .bind(display_name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::from)
            .ok_or_else(|| RepositoryError::NotFound(format!("user {id}")))
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    handle: String,
    display_name: String,
    avatar_url: String,
    access_token: String,
    role: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            handle: row.handle,
            display_name: row.display_name,
            avatar_url: row.avatar_url,
            access_token: row.access_token,
            role: row.role.into(),
        }
    }
}

pub struct NewUser {
    pub handle: String,
    pub display_name: String,
    pub avatar_url: String,
    pub access_token: String,
}

impl NewUser {
    pub fn new(
        handle: String,
        display_name: String,
        avatar_url: String,
        access_token: String,
    ) -> Self {
        Self {
            handle,
            display_name,
            avatar_url,
            access_token,
        }
    }
}
