use super::Database;
use crate::error::{Error, Result};
use crate::models::{User, UserInput};

fn db_err(err: sqlx::Error) -> Error {
    Error::from_db("User", err)
}

impl Database {
    pub async fn get_user(&self, id: i32) -> Result<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_one(self.get_pool())
            .await
            .map_err(db_err)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(self.get_pool())
            .await
            .map_err(db_err)
    }

    pub async fn create_user(&self, user: &UserInput) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, company_name, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.company_name)
        .bind(&user.phone)
        .fetch_one(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn update_user(&self, id: i32, user: &UserInput) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $1, email = $2, company_name = $3, phone = $4, updated_at = now()
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.company_name)
        .bind(&user.phone)
        .bind(id)
        .fetch_one(self.get_pool())
        .await
        .map_err(db_err)
    }
}
