use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use validator::{Validate, ValidationError};

use crate::validation::{is_slug, rule};

text_enum! {
    pub enum BlogStatus {
        Draft => "draft",
        Published => "published",
    }
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Blog {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub cover_image_url: Option<String>,
    pub status: BlogStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "slug_shape", skip_on_field_errors = false))]
pub struct BlogInput {
    #[validate(length(min = 1, max = 200, message = "is required (at most 200 characters)"))]
    pub title: String,
    /// Derived from the title when omitted.
    pub slug: Option<String>,
    #[validate(length(min = 1, message = "is required"))]
    pub content: String,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub excerpt: Option<String>,
    pub cover_image_url: Option<String>,
}

fn slug_shape(input: &BlogInput) -> Result<(), ValidationError> {
    match input.slug.as_deref().filter(|s| !s.is_empty()) {
        Some(slug) if !is_slug(slug) => Err(rule(
            "slug",
            "may only contain lowercase letters, digits and single hyphens",
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn input(slug: Option<&str>) -> BlogInput {
        BlogInput {
            title: "Spring sale".into(),
            slug: slug.map(String::from),
            content: "Everything must go.".into(),
            excerpt: None,
            cover_image_url: None,
        }
    }

    #[test]
    fn explicit_slug_must_be_well_formed() {
        assert!(input(None).validate().is_ok());
        assert!(input(Some("spring-sale")).validate().is_ok());

        let err = Error::from(input(Some("Spring Sale")).validate().unwrap_err());
        assert!(err.to_string().contains("slug: may only contain"));
    }

    #[test]
    fn title_and_content_are_required() {
        let mut blog = input(None);
        blog.title.clear();
        blog.content.clear();
        let message = Error::from(blog.validate().unwrap_err()).to_string();
        assert!(message.contains("title: is required"));
        assert!(message.contains("content: is required"));
    }
}
