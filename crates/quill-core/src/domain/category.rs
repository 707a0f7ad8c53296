use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Identifiable, slugify};
use crate::error::{DomainError, FieldError};

pub const MAX_NAME_LEN: usize = 50;
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Category entity - a named grouping of posts.
///
/// `post_count` is denormalized bookkeeping maintained by incremental
/// updates from the post service. It is not recomputed on read and may
/// drift if a post write succeeds while the counter write fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub post_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a category.
#[derive(Debug, Clone, Default)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

/// Partial update of a category. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Category {
    /// Build a validated category with a derived slug and a zero post count.
    pub fn new(input: NewCategory) -> Result<Self, DomainError> {
        let name = input.name.trim().to_string();
        let description = normalize_description(input.description);

        let errors = validate(&name, description.as_deref());
        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            slug: slugify(&name),
            name,
            description,
            post_count: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a patch, re-deriving the slug on rename and re-running validation.
    pub fn apply(&mut self, patch: CategoryPatch) -> Result<(), DomainError> {
        let name = patch
            .name
            .map(|n| n.trim().to_string())
            .unwrap_or_else(|| self.name.clone());
        let description = match patch.description {
            Some(d) => normalize_description(Some(d)),
            None => self.description.clone(),
        };

        let errors = validate(&name, description.as_deref());
        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }

        if name != self.name {
            self.slug = slugify(&name);
            self.name = name;
        }
        self.description = description;
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl Identifiable for Category {
    fn id(&self) -> Uuid {
        self.id
    }
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

fn validate(name: &str, description: Option<&str>) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if name.is_empty() {
        errors.push(FieldError::new("name", "Category name is required"));
    } else if name.chars().count() > MAX_NAME_LEN {
        errors.push(FieldError::new(
            "name",
            format!("Category name cannot exceed {} characters", MAX_NAME_LEN),
        ));
    } else if slugify(name).is_empty() {
        errors.push(FieldError::new(
            "name",
            "Category name must contain at least one letter or digit",
        ));
    }

    if let Some(d) = description {
        if d.chars().count() > MAX_DESCRIPTION_LEN {
            errors.push(FieldError::new(
                "description",
                format!(
                    "Description cannot exceed {} characters",
                    MAX_DESCRIPTION_LEN
                ),
            ));
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tech() -> Category {
        Category::new(NewCategory {
            name: "Tech".into(),
            description: None,
        })
        .unwrap()
    }

    #[test]
    fn test_new_category_starts_empty() {
        let category = tech();
        assert_eq!(category.slug, "tech");
        assert_eq!(category.post_count, 0);
        assert!(category.description.is_none());
    }

    #[test]
    fn test_name_is_required() {
        let err = Category::new(NewCategory {
            name: "   ".into(),
            description: None,
        })
        .unwrap_err();

        match err {
            DomainError::Validation(errors) => assert_eq!(errors[0].field, "name"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_description_limit() {
        let err = Category::new(NewCategory {
            name: "Long".into(),
            description: Some("x".repeat(MAX_DESCRIPTION_LEN + 1)),
        })
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref e) if e[0].field == "description"));

        let ok = Category::new(NewCategory {
            name: "Long".into(),
            description: Some("x".repeat(MAX_DESCRIPTION_LEN)),
        });
        assert!(ok.is_ok());
    }

    #[test]
    fn test_rename_rederives_slug() {
        let mut category = tech();
        category
            .apply(CategoryPatch {
                name: Some("Science & Tech".into()),
                description: Some("All things".into()),
            })
            .unwrap();

        assert_eq!(category.slug, "science-tech");
        assert_eq!(category.description.as_deref(), Some("All things"));
    }

    #[test]
    fn test_invalid_patch_leaves_category_untouched() {
        let mut category = tech();
        let result = category.apply(CategoryPatch {
            name: Some(String::new()),
            description: None,
        });

        assert!(result.is_err());
        assert_eq!(category.name, "Tech");
        assert_eq!(category.slug, "tech");
    }
}
