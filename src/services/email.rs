//! E-mail notifications for failure tickets

use std::{str::FromStr, sync::Arc};

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, Message, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};

use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
    models::{failure::Failure, technician::Technician},
};

/// Outgoing mail transport
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()>;
}

/// SMTP transport through lettre
#[derive(Clone)]
pub struct SmtpMailer {
    config: EmailConfig,
}

impl SmtpMailer {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, to: &str, subject: &str, body: &str) -> AppResult<Message> {
        let from_name = self.config.smtp_from_name.as_deref().unwrap_or("Camtrack");
        let from_mailbox = Mailbox::from_str(&format!("{} <{}>", from_name, self.config.smtp_from))
            .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;

        let to_mailbox = Mailbox::from_str(to)
            .map_err(|e| AppError::Internal(format!("Invalid to address: {}", e)))?;

        Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(format!(
                                r#"<html><body><pre>{}</pre></body></html>"#,
                                body.replace('\n', "<br>")
                            )),
                    ),
            )
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))
    }

    fn transport(&self) -> AppResult<SmtpTransport> {
        let builder = if self.config.smtp_use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AppError::Internal(format!("Failed to create SMTP transport: {}", e)))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        }
        .port(self.config.smtp_port);

        let builder = match (&self.config.smtp_username, &self.config.smtp_password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };
        Ok(builder.build())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        let email = self.build_message(to, subject, body)?;
        let mailer = self.transport()?;

        // lettre's SmtpTransport blocks
        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::Internal(format!("Mail task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;
        Ok(())
    }
}

/// Composes and dispatches ticket notifications; failures to send are logged, never returned
#[derive(Clone)]
pub struct NotificationService {
    mailer: Option<Arc<dyn Mailer>>,
    alert_recipients: Vec<String>,
}

impl NotificationService {
    pub fn new(config: EmailConfig) -> Self {
        let alert_recipients = config.alert_recipients.clone();
        let mailer: Option<Arc<dyn Mailer>> = if config.enabled {
            Some(Arc::new(SmtpMailer::new(config)))
        } else {
            None
        };
        Self {
            mailer,
            alert_recipients,
        }
    }

    pub fn with_mailer(mailer: Arc<dyn Mailer>, alert_recipients: Vec<String>) -> Self {
        Self {
            mailer: Some(mailer),
            alert_recipients,
        }
    }

    /// Alert the configured recipients about a critical ticket
    pub async fn critical_failure(&self, failure: &Failure, equipment_label: &str) -> usize {
        let Some(mailer) = &self.mailer else { return 0 };
        let (subject, body) = critical_failure_message(failure, equipment_label);

        let mut sent = 0;
        for to in &self.alert_recipients {
            match mailer.send(to, &subject, &body).await {
                Ok(()) => sent += 1,
                Err(e) => tracing::warn!(to = %to, error = %e, "Critical failure alert not sent"),
            }
        }
        sent
    }

    /// Tell a technician a ticket was assigned to them
    pub async fn failure_assigned(
        &self,
        failure: &Failure,
        technician: &Technician,
        equipment_label: &str,
    ) -> bool {
        let (Some(mailer), Some(to)) = (&self.mailer, technician.email.as_deref()) else {
            return false;
        };
        let (subject, body) = assignment_message(failure, technician, equipment_label);
        match mailer.send(to, &subject, &body).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(to = %to, error = %e, "Assignment notification not sent");
                false
            }
        }
    }
}

fn ticket_ref(failure: &Failure) -> String {
    failure
        .code
        .clone()
        .unwrap_or_else(|| format!("#{}", failure.id))
}

fn critical_failure_message(failure: &Failure, equipment_label: &str) -> (String, String) {
    let subject = format!("[Camtrack] CRITICAL failure {}: {}", ticket_ref(failure), failure.title);
    let body = format!(
        "A critical failure was reported.\n\nTicket: {}\nEquipment: {}\nTitle: {}\nDescription: {}\nReported at: {}\n",
        ticket_ref(failure),
        equipment_label,
        failure.title,
        failure.description.as_deref().unwrap_or("-"),
        failure.reported_at.format("%Y-%m-%d %H:%M UTC"),
    );
    (subject, body)
}

fn assignment_message(
    failure: &Failure,
    technician: &Technician,
    equipment_label: &str,
) -> (String, String) {
    let subject = format!("[Camtrack] Ticket {} assigned to you", ticket_ref(failure));
    let body = format!(
        "Hello {},\n\nTicket {} ({} priority) has been assigned to you.\n\nEquipment: {}\nTitle: {}\nDescription: {}\n",
        technician.full_name(),
        ticket_ref(failure),
        failure.priority,
        equipment_label,
        failure.title,
        failure.description.as_deref().unwrap_or("-"),
    );
    (subject, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::{EquipmentKind, FailurePriority, FailureStatus, TechnicianStatus};
    use chrono::Utc;

    fn failure() -> Failure {
        Failure {
            id: 12,
            code: Some("F-2024-00012".into()),
            title: "No video".into(),
            description: None,
            category: None,
            priority: FailurePriority::Critical,
            status: FailureStatus::Open,
            equipment_kind: EquipmentKind::Camera,
            equipment_id: 4,
            reported_by: Some(1),
            assigned_technician_id: None,
            reported_at: Utc::now(),
            assigned_at: None,
            repair_started_at: None,
            repair_finished_at: None,
            closed_at: None,
            resolution: None,
            requires_maintenance: false,
            external_ref: None,
            deleted: false,
            updated_at: Utc::now(),
        }
    }

    fn technician(email: Option<&str>) -> Technician {
        Technician {
            id: 3,
            employee_code: "T-03".into(),
            first_name: "Ana".into(),
            last_name: "Rojas".into(),
            specialty: None,
            phone: None,
            email: email.map(str::to_string),
            status: TechnicianStatus::Active,
            hired_on: None,
            user_id: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_critical_message_mentions_ticket() {
        let (subject, body) = critical_failure_message(&failure(), "CAM-004 Gate");
        assert!(subject.contains("F-2024-00012"));
        assert!(body.contains("CAM-004 Gate"));
    }

    #[tokio::test]
    async fn test_critical_alert_goes_to_every_recipient() {
        let mut mailer = MockMailer::new();
        mailer.expect_send().times(2).returning(|_, _, _| Ok(()));
        let service = NotificationService::with_mailer(
            Arc::new(mailer),
            vec!["a@campus.edu".into(), "b@campus.edu".into()],
        );
        assert_eq!(service.critical_failure(&failure(), "CAM-004").await, 2);
    }

    #[tokio::test]
    async fn test_send_errors_are_swallowed() {
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .returning(|_, _, _| Err(AppError::Internal("smtp down".into())));
        let service = NotificationService::with_mailer(Arc::new(mailer), vec!["a@campus.edu".into()]);
        assert_eq!(service.critical_failure(&failure(), "CAM-004").await, 0);
    }

    #[tokio::test]
    async fn test_assignment_needs_an_address() {
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|to, _, _| to.eq_ignore_ascii_case("ana@campus.edu"))
            .times(1)
            .returning(|_, _, _| Ok(()));
        let service = NotificationService::with_mailer(Arc::new(mailer), vec![]);

        assert!(!service.failure_assigned(&failure(), &technician(None), "CAM-004").await);
        assert!(
            service
                .failure_assigned(&failure(), &technician(Some("ana@campus.edu")), "CAM-004")
                .await
        );
    }

    #[tokio::test]
    async fn test_disabled_service_sends_nothing() {
        let service = NotificationService::new(EmailConfig::default());
        assert_eq!(service.critical_failure(&failure(), "CAM-004").await, 0);
    }
}
