//! Request extractors for authentication and principal-type checks.
//!
//! 1. Client sends `Authorization: Bearer <token>`
//! 2. [`auth::AuthUser`] verifies the token and exposes its claims
//! 3. [`auth::RequireTeacher`] / [`auth::RequireStudent`] additionally reject
//!    the other principal type with 403
//!
//! ```ignore
//! async fn create_course(RequireTeacher(teacher): RequireTeacher) -> impl IntoResponse {
//!     let teacher_id = teacher.principal_id()?;
//!     // ...
//! }
//! ```
//!
//! Ownership rules ("only the course's instructor", "the student themself")
//! need the target row and are checked in the controllers.

pub mod auth;
