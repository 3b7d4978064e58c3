use tracing::info;
use validator::Validate;

use crate::db::{BlogRecord, Database};
use crate::error::{Error, Result};
use crate::models::{Blog, BlogInput, BlogStatus};
use crate::services::ImageUpload;
use crate::state::AppState;
use crate::validation::{clean_optional, slugify};

/// Suffixes tried after a derived slug is taken: `title-2`, `title-3`, ...
const MAX_SLUG_SUFFIX: u32 = 50;

fn normalize(input: BlogInput) -> BlogInput {
    BlogInput {
        title: input.title.trim().to_string(),
        slug: clean_optional(input.slug).map(|s| s.to_lowercase()),
        content: input.content.trim().to_string(),
        excerpt: clean_optional(input.excerpt),
        cover_image_url: clean_optional(input.cover_image_url),
    }
}

/// Pick the slug for a post: the explicit one as given, or one derived
/// from the title made unique among the tenant's posts.
async fn resolve_slug(
    db: &Database,
    user_id: i32,
    input: &BlogInput,
    current_id: Option<i32>,
) -> Result<String> {
    if let Some(slug) = &input.slug {
        return Ok(slug.clone());
    }

    let base = slugify(&input.title);
    if base.is_empty() {
        return Err(Error::Validation(
            "slug: could not be derived from the title, provide one".to_string(),
        ));
    }

    let mut candidate = base.clone();
    for suffix in 2..=MAX_SLUG_SUFFIX + 1 {
        match db.get_blog_by_slug(user_id, &candidate).await {
            Err(Error::NotFound(_)) => return Ok(candidate),
            Ok(existing) if Some(existing.id) == current_id => return Ok(candidate),
            Ok(_) => candidate = format!("{}-{}", base, suffix),
            Err(e) => return Err(e),
        }
    }
    Err(Error::AlreadyExists(format!("Blog slug '{}'", base)))
}

pub async fn list(db: &Database, user_id: i32, status: Option<BlogStatus>) -> Result<Vec<Blog>> {
    db.get_blogs(user_id, status).await
}

pub async fn get(db: &Database, user_id: i32, id: i32) -> Result<Blog> {
    db.get_blog(user_id, id).await
}

pub async fn get_by_slug(db: &Database, user_id: i32, slug: &str) -> Result<Blog> {
    db.get_blog_by_slug(user_id, slug).await
}

pub async fn create(db: &Database, user_id: i32, input: BlogInput) -> Result<Blog> {
    let input = normalize(input);
    input.validate()?;
    let slug = resolve_slug(db, user_id, &input, None).await?;

    let blog = db
        .create_blog(
            user_id,
            &BlogRecord {
                title: &input.title,
                slug: &slug,
                content: &input.content,
                excerpt: input.excerpt.as_deref(),
                cover_image_url: input.cover_image_url.as_deref(),
            },
        )
        .await?;
    info!(user_id, blog_id = blog.id, slug = %blog.slug, "blog post created");
    Ok(blog)
}

pub async fn update(db: &Database, user_id: i32, id: i32, input: BlogInput) -> Result<Blog> {
    let input = normalize(input);
    input.validate()?;
    let slug = resolve_slug(db, user_id, &input, Some(id)).await?;

    db.update_blog(
        user_id,
        id,
        &BlogRecord {
            title: &input.title,
            slug: &slug,
            content: &input.content,
            excerpt: input.excerpt.as_deref(),
            cover_image_url: input.cover_image_url.as_deref(),
        },
    )
    .await
}

pub async fn publish(db: &Database, user_id: i32, id: i32) -> Result<Blog> {
    let blog = db.set_blog_status(user_id, id, BlogStatus::Published).await?;
    info!(user_id, blog_id = id, "blog post published");
    Ok(blog)
}

pub async fn unpublish(db: &Database, user_id: i32, id: i32) -> Result<Blog> {
    let blog = db.set_blog_status(user_id, id, BlogStatus::Draft).await?;
    info!(user_id, blog_id = id, "blog post unpublished");
    Ok(blog)
}

/// Upload a cover image to the image host and attach its URL to the post.
pub async fn attach_cover(state: &AppState, user_id: i32, id: i32, upload: ImageUpload) -> Result<Blog> {
    state.image_host.check(&upload)?;
    // Fail before uploading when the post is not the tenant's.
    state.db.get_blog(user_id, id).await?;

    let url = state.image_host.upload(upload).await?;
    state.db.set_blog_cover(user_id, id, &url).await
}

pub async fn delete(db: &Database, user_id: i32, id: i32) -> Result<()> {
    db.delete_blog(user_id, id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_explicit_slug() {
        let input = normalize(BlogInput {
            title: " Spring Sale ".into(),
            slug: Some(" Spring-Sale ".into()),
            content: "Everything must go".into(),
            excerpt: Some("".into()),
            cover_image_url: None,
        });
        assert_eq!(input.slug.as_deref(), Some("spring-sale"));
        assert_eq!(input.title, "Spring Sale");
        assert!(input.excerpt.is_none());
    }

    #[tokio::test]
    async fn untitled_symbols_need_an_explicit_slug() {
        let db = Database::connect_lazy("postgres://localhost:1/unused").unwrap();
        let input = BlogInput {
            title: "!!!".into(),
            slug: None,
            content: "body".into(),
            excerpt: None,
            cover_image_url: None,
        };
        let err = create(&db, 1, input).await.unwrap_err();
        assert!(matches!(err, Error::Validation(ref m) if m.starts_with("slug")));
    }
}
