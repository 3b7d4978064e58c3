use super::Database;
use crate::error::{Error, Result};
use crate::models::{Blog, BlogStatus};

fn db_err(err: sqlx::Error) -> Error {
    Error::from_db("Blog", err)
}

/// Normalized blog fields ready to persist.
#[derive(Debug, Clone)]
pub struct BlogRecord<'a> {
    pub title: &'a str,
    pub slug: &'a str,
    pub content: &'a str,
    pub excerpt: Option<&'a str>,
    pub cover_image_url: Option<&'a str>,
}

impl Database {
    pub async fn get_blogs(&self, user_id: i32, status: Option<BlogStatus>) -> Result<Vec<Blog>> {
        sqlx::query_as::<_, Blog>(
            r#"
            SELECT * FROM blogs
            WHERE user_id = $1 AND ($2::text IS NULL OR status = $2)
            ORDER BY COALESCE(published_at, created_at) DESC
            "#,
        )
        .bind(user_id)
        .bind(status)
        .fetch_all(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn get_blog(&self, user_id: i32, id: i32) -> Result<Blog> {
        sqlx::query_as::<_, Blog>("SELECT * FROM blogs WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_one(self.get_pool())
            .await
            .map_err(db_err)
    }

    pub async fn get_blog_by_slug(&self, user_id: i32, slug: &str) -> Result<Blog> {
        sqlx::query_as::<_, Blog>("SELECT * FROM blogs WHERE slug = $1 AND user_id = $2")
            .bind(slug)
            .bind(user_id)
            .fetch_one(self.get_pool())
            .await
            .map_err(db_err)
    }

    pub async fn create_blog(&self, user_id: i32, blog: &BlogRecord<'_>) -> Result<Blog> {
        sqlx::query_as::<_, Blog>(
            r#"
            INSERT INTO blogs (user_id, title, slug, content, excerpt, cover_image_url, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(blog.title)
        .bind(blog.slug)
        .bind(blog.content)
        .bind(blog.excerpt)
        .bind(blog.cover_image_url)
        .bind(BlogStatus::Draft)
        .fetch_one(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn update_blog(&self, user_id: i32, id: i32, blog: &BlogRecord<'_>) -> Result<Blog> {
        sqlx::query_as::<_, Blog>(
            r#"
            UPDATE blogs
            SET title = $1, slug = $2, content = $3, excerpt = $4, cover_image_url = $5,
                updated_at = now()
            WHERE id = $6 AND user_id = $7
            RETURNING *
            "#,
        )
        .bind(blog.title)
        .bind(blog.slug)
        .bind(blog.content)
        .bind(blog.excerpt)
        .bind(blog.cover_image_url)
        .bind(id)
        .bind(user_id)
        .fetch_one(self.get_pool())
        .await
        .map_err(db_err)
    }

    /// Publishing stamps `published_at` the first time; unpublishing
    /// clears it.
    pub async fn set_blog_status(&self, user_id: i32, id: i32, status: BlogStatus) -> Result<Blog> {
        sqlx::query_as::<_, Blog>(
            r#"
            UPDATE blogs
            SET status = $1,
                published_at = CASE WHEN $1 = 'published' THEN COALESCE(published_at, now()) ELSE NULL END,
                updated_at = now()
            WHERE id = $2 AND user_id = $3
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(id)
        .bind(user_id)
        .fetch_one(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn set_blog_cover(&self, user_id: i32, id: i32, url: &str) -> Result<Blog> {
        sqlx::query_as::<_, Blog>(
            r#"
            UPDATE blogs SET cover_image_url = $1, updated_at = now()
            WHERE id = $2 AND user_id = $3
            RETURNING *
            "#,
        )
        .bind(url)
        .bind(id)
        .bind(user_id)
        .fetch_one(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn delete_blog(&self, user_id: i32, id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.get_pool())
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Blog".to_string()));
        }
        Ok(())
    }
}
