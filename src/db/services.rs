use super::Database;
use crate::error::{Error, Result};
use crate::models::{Service, ServiceInput};

fn db_err(err: sqlx::Error) -> Error {
    Error::from_db("Service", err)
}

impl Database {
    pub async fn get_services(&self, user_id: i32) -> Result<Vec<Service>> {
        sqlx::query_as::<_, Service>("SELECT * FROM services WHERE user_id = $1 ORDER BY name ASC")
            .bind(user_id)
            .fetch_all(self.get_pool())
            .await
            .map_err(db_err)
    }

    pub async fn get_service(&self, user_id: i32, id: i32) -> Result<Service> {
        sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_one(self.get_pool())
            .await
            .map_err(db_err)
    }

    pub async fn create_service(&self, user_id: i32, service: &ServiceInput) -> Result<Service> {
        sqlx::query_as::<_, Service>(
            r#"
            INSERT INTO services (user_id, name, description, price, duration_minutes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&service.name)
        .bind(&service.description)
        .bind(service.price)
        .bind(service.duration_minutes)
        .fetch_one(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn update_service(
        &self,
        user_id: i32,
        id: i32,
        service: &ServiceInput,
    ) -> Result<Service> {
        sqlx::query_as::<_, Service>(
            r#"
            UPDATE services
            SET name = $1, description = $2, price = $3, duration_minutes = $4, updated_at = now()
            WHERE id = $5 AND user_id = $6
            RETURNING *
            "#,
        )
        .bind(&service.name)
        .bind(&service.description)
        .bind(service.price)
        .bind(service.duration_minutes)
        .bind(id)
        .bind(user_id)
        .fetch_one(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn delete_service(&self, user_id: i32, id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.get_pool())
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Service".to_string()));
        }
        Ok(())
    }
}
