pub mod course;
pub mod registration;

pub use course::{Course, DEFAULT_COURSE_DESCRIPTION, NewCourseRequest};
pub use registration::{
    NewRegistrationRequest, Registration, RegistrationStatus, StatusChange, UpdateStatusRequest,
};
