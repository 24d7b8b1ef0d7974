use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::db::repository;
use crate::error::AppError;
use crate::mail::Mailer;
use crate::models::{NewRegistrationRequest, Registration, RegistrationStatus, StatusChange};
use crate::sheets::SheetSink;

/// The registration workflow: submissions enter as `pending`, an admin
/// decision moves them one way into `accepted` or `rejected` and notifies
/// the registrant.
pub struct RegistrationService {
    db: SqlitePool,
    mailer: Arc<dyn Mailer>,
    sheets: Arc<dyn SheetSink>,
}

impl RegistrationService {
    pub fn new(db: SqlitePool, mailer: Arc<dyn Mailer>, sheets: Arc<dyn SheetSink>) -> Self {
        Self { db, mailer, sheets }
    }

    pub async fn submit(
        &self,
        mut req: NewRegistrationRequest,
    ) -> Result<Registration, AppError> {
        req.email = normalize_email(&req.email);

        for (field, value) in [
            ("name", &req.name),
            ("email", &req.email),
            ("college", &req.college),
            ("branch", &req.branch),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!("`{}` is required", field)));
            }
        }

        let registration = repository::insert_registration(&self.db, req).await?;
        info!("registration submitted: {} <{}>", registration.name, registration.email);

        // The database is the store of record; the spreadsheet is a mirror
        // and a failed append never fails the submission.
        if let Err(e) = self.sheets.append(&sheet_row(&registration)).await {
            warn!("sheet append failed for {}: {}", registration.id, e);
        }

        Ok(registration)
    }

    pub async fn list(&self) -> Result<Vec<Registration>, AppError> {
        repository::fetch_registrations(&self.db).await
    }

    /// Applies an admin decision. Only `pending -> accepted` and
    /// `pending -> rejected` are legal transitions; terminal records stay
    /// where they are. The notification is dispatched after the persist
    /// and its failure is reported via `notified`, never rolled back.
    pub async fn set_status(
        &self,
        id: &str,
        status: RegistrationStatus,
    ) -> Result<StatusChange, AppError> {
        if status == RegistrationStatus::Pending {
            return Err(AppError::Validation(
                "Cannot reset a registration to pending".to_string(),
            ));
        }

        let current = repository::find_registration_by_id(&self.db, id)
            .await?
            .ok_or(AppError::NotFound("User"))?;

        if current.status.is_terminal() {
            return Err(AppError::Duplicate(format!(
                "Registration already {}",
                current.status
            )));
        }

        let won = repository::set_registration_status(&self.db, id, status).await?;
        if !won {
            // Another admin decided between our read and the update.
            let now = repository::find_registration_by_id(&self.db, id)
                .await?
                .ok_or(AppError::NotFound("User"))?;
            return Err(AppError::Duplicate(format!(
                "Registration already {}",
                now.status
            )));
        }

        let registration = Registration { status, ..current };

        let subject = format!("Registration {}", status.as_str().to_uppercase());
        let body = format!(
            "Hello {},\n\nYour registration has been {}.\n\nThank you!",
            registration.name, status
        );
        let notified = match self.mailer.send(&registration.email, &subject, &body).await {
            Ok(()) => true,
            Err(e) => {
                warn!("notification failed for {}: {}", registration.email, e);
                false
            }
        };

        info!("registration {} {} (notified: {})", registration.id, status, notified);
        Ok(StatusChange {
            registration,
            notified,
        })
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn sheet_row(r: &Registration) -> Vec<String> {
    vec![
        r.created_at.clone(),
        r.name.clone(),
        r.email.clone(),
        r.college.clone(),
        r.branch.clone(),
        r.courses.join(", "),
        r.status.to_string(),
    ]
}
