//! Catalogue seeding from a JSON document.
//!
//! Courses are upserted by slug and users by username, so applying the same
//! document twice leaves the store unchanged apart from refreshed password
//! salts.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::domain::ports::{
    CourseRepository, CourseRepositoryError, UserCredentialsRecord, UserRepository,
    UserRepositoryError,
};
use crate::domain::{
    CourseId, CourseStructure, DisplayName, Module, Role, User, UserId, UserValidationError,
    digest_password, generate_salt,
};

/// Course entry in a seed document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SeedCourse {
    /// Stable key used to match existing courses.
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Modules in display order.
    pub modules: Vec<Module>,
}

/// Account entry in a seed document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SeedUser {
    pub username: String,
    pub display_name: String,
    pub role: Role,
    /// Plain-text password; only its salted digest is stored.
    pub password: String,
}

/// Parsed seed document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedDocument {
    #[serde(default)]
    pub courses: Vec<SeedCourse>,
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

impl SeedDocument {
    /// Parse a JSON seed document.
    ///
    /// # Examples
    /// ```
    /// use academy::domain::SeedDocument;
    ///
    /// let doc = SeedDocument::from_json(r#"{"courses": [], "users": []}"#).expect("valid");
    /// assert!(doc.courses.is_empty());
    /// ```
    pub fn from_json(raw: &str) -> Result<Self, CatalogueSeedError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Counts of upserted entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedOutcome {
    pub courses: usize,
    pub users: usize,
}

/// Errors raised while validating or applying a seed document.
#[derive(Debug, Error)]
pub enum CatalogueSeedError {
    #[error("seed document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("course slug must not be empty")]
    EmptySlug,
    #[error("course slug {slug} appears more than once")]
    DuplicateSlug { slug: String },
    #[error("user {username} is invalid: {source}")]
    InvalidUser {
        username: String,
        #[source]
        source: UserValidationError,
    },
    #[error("user {username} has an empty password")]
    EmptyPassword { username: String },
    #[error("course persistence failed: {0}")]
    Course(#[from] CourseRepositoryError),
    #[error("user persistence failed: {0}")]
    User(#[from] UserRepositoryError),
}

/// Applies seed documents through the course and user repositories.
#[derive(Clone)]
pub struct CatalogueSeeder<C, U> {
    courses: Arc<C>,
    users: Arc<U>,
}

impl<C, U> CatalogueSeeder<C, U> {
    pub fn new(courses: Arc<C>, users: Arc<U>) -> Self {
        Self { courses, users }
    }
}

fn prepare_user(seed: &SeedUser) -> Result<UserCredentialsRecord, CatalogueSeedError> {
    let display_name =
        DisplayName::new(seed.display_name.as_str()).map_err(|source| {
            CatalogueSeedError::InvalidUser {
                username: seed.username.clone(),
                source,
            }
        })?;
    if seed.password.is_empty() {
        return Err(CatalogueSeedError::EmptyPassword {
            username: seed.username.clone(),
        });
    }
    let salt = generate_salt();
    Ok(UserCredentialsRecord {
        user: User::new(UserId::random(), seed.username.trim(), display_name, seed.role),
        password_digest: digest_password(&salt, &seed.password),
        password_salt: salt,
    })
}

fn validate_courses(courses: &[SeedCourse]) -> Result<(), CatalogueSeedError> {
    let mut seen = HashSet::new();
    for course in courses {
        let slug = course.slug.trim();
        if slug.is_empty() {
            return Err(CatalogueSeedError::EmptySlug);
        }
        if !seen.insert(slug) {
            return Err(CatalogueSeedError::DuplicateSlug {
                slug: slug.to_owned(),
            });
        }
    }
    Ok(())
}

impl<C, U> CatalogueSeeder<C, U>
where
    C: CourseRepository,
    U: UserRepository,
{
    /// Validate the whole document, then upsert courses and users.
    ///
    /// Nothing is written when validation fails.
    pub async fn apply(&self, document: &SeedDocument) -> Result<SeedOutcome, CatalogueSeedError> {
        validate_courses(&document.courses)?;
        let users = document
            .users
            .iter()
            .map(prepare_user)
            .collect::<Result<Vec<_>, _>>()?;

        for seed in &document.courses {
            let course = CourseStructure {
                id: CourseId::random(),
                slug: seed.slug.trim().to_owned(),
                title: seed.title.clone(),
                description: seed.description.clone(),
                modules: seed.modules.clone(),
            };
            let id = self.courses.upsert_course(&course).await?;
            info!(course_id = %id, slug = %course.slug, lessons = course.total_lessons(), "course seeded");
        }

        for (seed, mut record) in document.users.iter().zip(users) {
            if let Some(existing) = self.users.find_by_username(seed.username.trim()).await? {
                record.user = User::new(
                    existing.user.id().clone(),
                    record.user.username(),
                    record.user.display_name().clone(),
                    record.user.role(),
                );
            }
            self.users.upsert(&record).await?;
            info!(username = %seed.username, role = %seed.role, "user seeded");
        }

        Ok(SeedOutcome {
            courses: document.courses.len(),
            users: document.users.len(),
        })
    }
}
