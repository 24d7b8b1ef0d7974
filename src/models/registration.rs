use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of a registration. New records start out `Pending`; an admin
/// decision moves them to one of the two terminal states and there is no
/// way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "pending",
            RegistrationStatus::Accepted => "accepted",
            RegistrationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RegistrationStatus::Pending),
            "accepted" => Some(RegistrationStatus::Accepted),
            "rejected" => Some(RegistrationStatus::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RegistrationStatus::Pending)
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub id: String,
    pub name: String,
    pub email: String,
    pub college: String,
    pub branch: String,
    pub courses: Vec<String>,
    pub status: RegistrationStatus,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRegistrationRequest {
    pub name: String,
    pub email: String,
    pub college: String,
    pub branch: String,
    pub courses: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: RegistrationStatus,
}

/// Outcome of an admin decision. The persisted transition and the
/// notification dispatch succeed or fail independently.
#[derive(Debug, Clone, Serialize)]
pub struct StatusChange {
    pub registration: Registration,
    pub notified: bool,
}
