use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use registrar_auth::PrincipalType;
use registrar_core::{ErrorResponse, MessageResponse};

use crate::modules::attendance::model::{Attendance, AttendanceStatus, RecordAttendanceDto};
use crate::modules::auth::model::{
    AuthenticatedUser, LoginRequest, LoginResponse, RegisterRequest,
};
use crate::modules::course_rooms::model::{
    CourseRoom, CourseRoomWithCourse, CreateCourseRoomDto, RoomCourse, UpdateCourseRoomDto,
};
use crate::modules::courses::model::{Course, CreateCourseDto, UpdateCourseDto};
use crate::modules::departments::model::{
    CreateDepartmentDto, Department, DepartmentCourseSummary, DepartmentResponse,
    DepartmentTeacherSummary, DepartmentWithMembers, UpdateDepartmentDto,
};
use crate::modules::enrollments::model::{
    CreateEnrollmentDto, EnrolledCourse, Enrollment, StudentEnrollment, UpdateEnrollmentDto,
};
use crate::modules::students::model::{Gender, Student, StudentStatus, UpdateStudentDto};
use crate::modules::teachers::model::{Teacher, UpdateTeacherDto};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register_student,
        crate::modules::auth::controller::login_student,
        crate::modules::auth::controller::register_teacher,
        crate::modules::auth::controller::login_teacher,
        crate::modules::students::controller::get_students,
        crate::modules::students::controller::get_student,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::delete_student,
        crate::modules::teachers::controller::get_teachers,
        crate::modules::teachers::controller::get_teacher,
        crate::modules::teachers::controller::update_teacher,
        crate::modules::teachers::controller::delete_teacher,
        crate::modules::departments::controller::create_department,
        crate::modules::departments::controller::get_departments,
        crate::modules::departments::controller::get_department,
        crate::modules::departments::controller::update_department,
        crate::modules::departments::controller::delete_department,
        crate::modules::courses::controller::create_course,
        crate::modules::courses::controller::get_courses,
        crate::modules::courses::controller::get_course,
        crate::modules::courses::controller::update_course,
        crate::modules::courses::controller::delete_course,
        crate::modules::enrollments::controller::create_enrollment,
        crate::modules::enrollments::controller::get_enrollments,
        crate::modules::enrollments::controller::get_student_enrollments,
        crate::modules::enrollments::controller::get_enrollment,
        crate::modules::enrollments::controller::update_enrollment,
        crate::modules::enrollments::controller::delete_enrollment,
        crate::modules::attendance::controller::record_attendance,
        crate::modules::attendance::controller::get_student_attendance,
        crate::modules::attendance::controller::get_course_attendance,
        crate::modules::course_rooms::controller::create_course_room,
        crate::modules::course_rooms::controller::get_course_rooms,
        crate::modules::course_rooms::controller::get_teacher_rooms,
        crate::modules::course_rooms::controller::get_student_rooms,
        crate::modules::course_rooms::controller::get_course_room,
        crate::modules::course_rooms::controller::update_course_room,
        crate::modules::course_rooms::controller::delete_course_room,
    ),
    components(
        schemas(
            ErrorResponse,
            MessageResponse,
            PrincipalType,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            AuthenticatedUser,
            Student,
            StudentStatus,
            Gender,
            UpdateStudentDto,
            Teacher,
            UpdateTeacherDto,
            Department,
            DepartmentCourseSummary,
            DepartmentTeacherSummary,
            DepartmentWithMembers,
            DepartmentResponse,
            CreateDepartmentDto,
            UpdateDepartmentDto,
            Course,
            CreateCourseDto,
            UpdateCourseDto,
            Enrollment,
            EnrolledCourse,
            StudentEnrollment,
            CreateEnrollmentDto,
            UpdateEnrollmentDto,
            Attendance,
            AttendanceStatus,
            RecordAttendanceDto,
            CourseRoom,
            CourseRoomWithCourse,
            RoomCourse,
            CreateCourseRoomDto,
            UpdateCourseRoomDto,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Student and teacher registration and login"),
        (name = "Students", description = "Student records"),
        (name = "Teachers", description = "Teacher records"),
        (name = "Departments", description = "Departments with their courses and teachers"),
        (name = "Courses", description = "Course catalogue"),
        (name = "Enrollments", description = "Student enrollments in courses"),
        (name = "Attendance", description = "Per-day attendance marks"),
        (name = "Course Rooms", description = "One virtual room per course")
    ),
    info(
        title = "Registrar API",
        version = "0.1.0",
        description = "Student information service: students, teachers, departments, courses, enrollments, attendance and course rooms.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_module() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/student/register",
            "/api/teacher/login",
            "/api/department/{id}",
            "/api/course",
            "/api/enrollment/entry/{id}",
            "/api/attendance/course/{course_id}",
            "/api/course-room/student",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
