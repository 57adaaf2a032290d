//! Credential service shared by students and teachers: registration,
//! password login and token issuance.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use router::{init_student_auth_router, init_teacher_auth_router};
