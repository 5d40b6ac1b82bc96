//! Email delivery for duty notifications.
//!
//! Uses the SMTP configuration from the main config file; when email is
//! not configured the notifier logs and skips, so deployments without an
//! SMTP relay still work.

use anyhow::Result;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::EmailConfig;
use crate::db::{DbPool, DutyDetail};

use super::DutyNotifier;

pub struct EmailNotifier {
    db: DbPool,
    config: EmailConfig,
}

impl EmailNotifier {
    pub fn new(db: DbPool, config: EmailConfig) -> Self {
        Self { db, config }
    }

    /// Resolve recipient user ids to the addresses of users who opted in
    /// to email.
    async fn recipient_addresses(&self, recipients: &[String]) -> Result<Vec<String>> {
        if recipients.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; recipients.len()].join(", ");
        let sql = format!(
            "SELECT email FROM users WHERE receive_email = 1 AND id IN ({placeholders})"
        );
        let mut query = sqlx::query_as::<_, (String,)>(&sql);
        for id in recipients {
            query = query.bind(id);
        }
        Ok(query
            .fetch_all(&self.db)
            .await?
            .into_iter()
            .map(|(email,)| email)
            .collect())
    }

    async fn send_email(&self, to: &[String], subject: &str, text: &str, html: &str) -> Result<()> {
        let smtp_host = self
            .config
            .smtp_host
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("SMTP host not configured"))?;
        let from_address = self
            .config
            .from_address
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("From address not configured"))?;

        let from: Mailbox = format!("{} <{}>", self.config.from_name, from_address).parse()?;

        let mut builder = Message::builder().from(from).subject(subject);
        for address in to {
            builder = builder.bcc(address.parse()?);
        }

        let email = builder.multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(text.to_string()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(html.to_string()),
                ),
        )?;

        let mailer = if self.config.smtp_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(smtp_host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(smtp_host)
        }
        .port(self.config.smtp_port);

        let mailer = if let (Some(username), Some(password)) =
            (&self.config.smtp_username, &self.config.smtp_password)
        {
            mailer.credentials(Credentials::new(username.clone(), password.clone()))
        } else {
            mailer
        };

        mailer.build().send(email).await?;
        Ok(())
    }
}

#[async_trait]
impl DutyNotifier for EmailNotifier {
    async fn duties_dropped(&self, duties: &[DutyDetail], recipients: &[String]) -> Result<()> {
        if duties.is_empty() {
            return Ok(());
        }
        if !self.config.is_configured() {
            tracing::warn!("Email not configured, skipping duty drop notification");
            return Ok(());
        }

        let addresses = self.recipient_addresses(recipients).await?;
        if addresses.is_empty() {
            tracing::debug!("No opted-in recipients for duty drop notification");
            return Ok(());
        }

        let subject = render_drop_subject(duties);
        let text = render_drop_text(duties);
        let html = render_drop_html(duties);

        self.send_email(&addresses, &subject, &text, &html).await?;

        tracing::info!(
            duties = duties.len(),
            recipients = addresses.len(),
            "Sent duty drop notification"
        );
        Ok(())
    }
}

/// Subject line spanning the dropped batch, e.g.
/// `DUTY DUTY DUTY 0900-1000 on Tue, 02 Jan 2024 at Front Desk`.
pub fn render_drop_subject(duties: &[DutyDetail]) -> String {
    let first = &duties[0];
    let last = &duties[duties.len() - 1];
    format!(
        "DUTY DUTY DUTY {}-{} on {} at {}",
        first.start_time.format("%H%M"),
        last.end_time.format("%H%M"),
        first.date.format("%a, %d %b %Y"),
        first.place_name
    )
}

fn render_duty_line(duty: &DutyDetail) -> String {
    format!(
        "{} {}-{} at {}",
        duty.date.format("%a, %d %b %Y"),
        duty.start_time.format("%H%M"),
        duty.end_time.format("%H%M"),
        duty.place_name
    )
}

pub fn render_drop_text(duties: &[DutyDetail]) -> String {
    let mut body = String::from("The following duties were dropped and need coverage:\n\n");
    for duty in duties {
        body.push_str(&format!("  - {}\n", render_duty_line(duty)));
    }
    body.push_str("\nLog in to grab a duty before someone else does.\n");
    body
}

pub fn render_drop_html(duties: &[DutyDetail]) -> String {
    let items: String = duties
        .iter()
        .map(|d| format!("<li>{}</li>", render_duty_line(d)))
        .collect();
    format!(
        "<html><body>\
         <p>The following duties were dropped and need coverage:</p>\
         <ul>{items}</ul>\
         <p>Log in to <strong>grab</strong> a duty before someone else does.</p>\
         </body></html>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn detail(date: (i32, u32, u32), start: (u32, u32), end: (u32, u32)) -> DutyDetail {
        DutyDetail {
            id: "d1".to_string(),
            timeslot_id: "ts1".to_string(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            user_id: None,
            free: true,
            request_user_id: None,
            place_name: "Front Desk".to_string(),
            day: "Tuesday".to_string(),
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            mc_only: false,
            owner_username: None,
        }
    }

    #[test]
    fn test_subject_single_duty() {
        let duties = vec![detail((2024, 1, 2), (9, 0), (10, 0))];
        assert_eq!(
            render_drop_subject(&duties),
            "DUTY DUTY DUTY 0900-1000 on Tue, 02 Jan 2024 at Front Desk"
        );
    }

    #[test]
    fn test_subject_spans_batch() {
        let duties = vec![
            detail((2024, 1, 2), (9, 0), (10, 0)),
            detail((2024, 1, 2), (10, 0), (11, 0)),
            detail((2024, 1, 2), (11, 0), (12, 0)),
        ];
        assert_eq!(
            render_drop_subject(&duties),
            "DUTY DUTY DUTY 0900-1200 on Tue, 02 Jan 2024 at Front Desk"
        );
    }

    #[test]
    fn test_bodies_mention_grabbing() {
        let duties = vec![detail((2024, 1, 2), (9, 0), (10, 0))];
        assert!(render_drop_text(&duties).contains("grab"));
        assert!(render_drop_html(&duties).contains("grab"));
        assert!(render_drop_text(&duties).contains("Tue, 02 Jan 2024"));
    }
}
