//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Courses in the catalogue, unique by slug.
    courses (id) {
        id -> Uuid,
        slug -> Varchar,
        title -> Varchar,
        description -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Ordered modules of a course.
    course_modules (course_id, module_index) {
        course_id -> Uuid,
        /// Zero-based position within the course.
        module_index -> Int4,
        title -> Varchar,
    }
}

diesel::table! {
    /// Ordered lessons of a module.
    course_lessons (course_id, module_index, lesson_index) {
        course_id -> Uuid,
        module_index -> Int4,
        /// Zero-based position within the module.
        lesson_index -> Int4,
        title -> Varchar,
        video_id -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Accounts with salted password digests.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        display_name -> Varchar,
        /// `student` or `admin`.
        role -> Varchar,
        password_salt -> Varchar,
        password_digest -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Issued bearer tokens, stored by digest only.
    access_tokens (token_digest) {
        token_digest -> Varchar,
        user_id -> Uuid,
        expires_at -> Timestamptz,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One row per (user, course) pair.
    enrollments (id) {
        id -> Uuid,
        user_id -> Uuid,
        course_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Lesson completion facts keyed by enrollment and position.
    progress_records (enrollment_id, module_index, lesson_index) {
        enrollment_id -> Uuid,
        module_index -> Int4,
        lesson_index -> Int4,
        completed -> Bool,
        completed_at -> Nullable<Timestamptz>,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Lesson questions and admin replies.
    lesson_comments (id) {
        id -> Uuid,
        course_id -> Uuid,
        module_index -> Int4,
        lesson_index -> Int4,
        author_id -> Uuid,
        parent_id -> Nullable<Uuid>,
        body -> Text,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(course_modules -> courses (course_id));
diesel::joinable!(course_lessons -> courses (course_id));
diesel::joinable!(access_tokens -> users (user_id));
diesel::joinable!(enrollments -> users (user_id));
diesel::joinable!(enrollments -> courses (course_id));
diesel::joinable!(progress_records -> enrollments (enrollment_id));
diesel::joinable!(lesson_comments -> users (author_id));
diesel::joinable!(lesson_comments -> courses (course_id));

diesel::allow_tables_to_appear_in_same_query!(
    access_tokens,
    course_lessons,
    course_modules,
    courses,
    enrollments,
    lesson_comments,
    progress_records,
    users,
);
