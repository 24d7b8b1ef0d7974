use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const DEFAULT_COURSE_DESCRIPTION: &str = "No description provided";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCourseRequest {
    pub name: String,
    pub description: Option<String>,
}
