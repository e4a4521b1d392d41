use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

pub const USER_COLUMNS: &str = "id, email, name, gender, age, dob, job_role, city, work_duration, \
     distance, job_type, salary, company, is_deleted, created_at, updated_at";

/// Database model for an account
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub gender: Option<String>,
    pub age: Option<i32>,
    pub dob: Option<NaiveDate>,
    // Wellness assessment
    pub job_role: Option<String>,
    pub city: Option<String>,
    pub work_duration: Option<String>,
    pub distance: Option<f64>,
    pub job_type: Option<String>,
    pub salary: Option<f64>,
    pub company: Option<String>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Columns written when an account is first created
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub gender: Option<String>,
    pub age: Option<i32>,
    pub dob: Option<NaiveDate>,
}

impl NewUser {
    pub fn new(email: impl Into<String>, name: Option<String>) -> Self {
        Self {
            email: email.into(),
            name,
            ..Default::default()
        }
    }
}

/// Profile and assessment fields a user may change. `None` leaves the column
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub age: Option<i32>,
    pub dob: Option<NaiveDate>,
    pub job_role: Option<String>,
    pub city: Option<String>,
    pub work_duration: Option<String>,
    pub distance: Option<f64>,
    pub job_type: Option<String>,
    pub salary: Option<f64>,
    pub company: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.gender.is_none()
            && self.age.is_none()
            && self.dob.is_none()
            && self.job_role.is_none()
            && self.city.is_none()
            && self.work_duration.is_none()
            && self.distance.is_none()
            && self.job_type.is_none()
            && self.salary.is_none()
            && self.company.is_none()
    }
}
