//! Email notification service implementation
//!
//! This service handles message formatting and best-effort delivery through
//! a Resend-compatible HTTP API. Delivery is optional: when no API key is
//! configured the service is disabled and every send is a silent no-op, so
//! registration succeeds with or without this collaborator. Failures are
//! logged and never propagated to the registration result.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::settings::EmailConfig;
use crate::models::event::Event;
use crate::utils::errors::{GatherBuddyError, Result};
use crate::utils::helpers::format_event_time;

/// A fully rendered message for one recipient
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Wire payload for the delivery API
#[derive(Debug, Serialize)]
struct SendEmailPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Email service for registration notifications
#[derive(Debug, Clone)]
pub struct EmailService {
    client: reqwest::Client,
    config: EmailConfig,
    templates: HashMap<String, HashMap<String, String>>,
}

impl EmailService {
    /// Create a new EmailService instance
    pub fn new(config: EmailConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            config,
            templates: Self::load_default_templates(),
        })
    }

    /// Check whether delivery is configured
    pub fn is_enabled(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Deliver one message, best-effort. Disabled service is a no-op.
    pub async fn send(&self, message: &EmailMessage) -> Result<()> {
        let api_key = match &self.config.api_key {
            Some(key) => key,
            None => {
                debug!(to = %message.to, "Email delivery skipped: no API key configured");
                return Ok(());
            }
        };

        let payload = SendEmailPayload {
            from: &self.config.from_address,
            to: &message.to,
            subject: &message.subject,
            html: &message.html,
        };

        let response = self
            .client
            .post(format!("{}/emails", self.config.api_url))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        if response.status().is_success() {
            info!(to = %message.to, subject = %message.subject, "Email delivered");
            Ok(())
        } else {
            let status = response.status();
            warn!(to = %message.to, status = %status, "Email delivery rejected");
            Err(GatherBuddyError::ServiceUnavailable(format!(
                "email API returned {status}"
            )))
        }
    }

    /// Confirmation message for the attendee who just registered
    pub fn attendee_confirmation(
        &self,
        to: &str,
        attendee_name: &str,
        event: &Event,
        food_selections: &[(String, i32)],
        language: &str,
    ) -> EmailMessage {
        let mut params = HashMap::new();
        params.insert("name".to_string(), attendee_name.to_string());
        params.insert("event_title".to_string(), event.display_title().to_string());
        params.insert("event_location".to_string(), event.location.clone());
        params.insert("event_date".to_string(), format_event_time(event.start_date));
        params.insert(
            "food_list".to_string(),
            Self::format_food_list(food_selections),
        );

        EmailMessage {
            to: to.to_string(),
            subject: self.format_template("attendee_subject", language, &params),
            html: self.format_template("attendee_body", language, &params),
        }
    }

    /// Notification message for the event organizer
    pub fn organizer_notification(
        &self,
        to: &str,
        organizer_name: &str,
        attendee_name: &str,
        event: &Event,
        guest_count: i32,
        total_attendees: i64,
        food_selections: &[(String, i32)],
        language: &str,
    ) -> EmailMessage {
        let mut params = HashMap::new();
        params.insert("name".to_string(), organizer_name.to_string());
        params.insert("attendee".to_string(), attendee_name.to_string());
        params.insert("event_title".to_string(), event.display_title().to_string());
        params.insert("guest_count".to_string(), guest_count.to_string());
        params.insert("total_attendees".to_string(), total_attendees.to_string());
        params.insert(
            "food_list".to_string(),
            Self::format_food_list(food_selections),
        );

        EmailMessage {
            to: to.to_string(),
            subject: self.format_template("organizer_subject", language, &params),
            html: self.format_template("organizer_body", language, &params),
        }
    }

    /// Format a template for a language, interpolating `{param}` markers
    fn format_template(
        &self,
        key: &str,
        language: &str,
        params: &HashMap<String, String>,
    ) -> String {
        let by_language = match self.templates.get(key) {
            Some(t) => t,
            None => return String::new(),
        };

        let template = by_language
            .get(language)
            .or_else(|| by_language.get("kk"))
            .cloned()
            .unwrap_or_default();

        let mut formatted = template;
        for (key, value) in params {
            let placeholder = format!("{{{}}}", key);
            formatted = formatted.replace(&placeholder, value);
        }
        formatted
    }

    fn format_food_list(food_selections: &[(String, i32)]) -> String {
        if food_selections.is_empty() {
            return String::new();
        }

        let items: String = food_selections
            .iter()
            .map(|(name, quantity)| format!("<li><strong>{name}</strong> × {quantity}</li>"))
            .collect();
        format!("<ul>{items}</ul>")
    }

    /// Load default message templates
    fn load_default_templates() -> HashMap<String, HashMap<String, String>> {
        let mut templates = HashMap::new();

        templates.insert(
            "attendee_subject".to_string(),
            HashMap::from([
                ("kk".to_string(), "Тіркеу расталды: {event_title}".to_string()),
                (
                    "en".to_string(),
                    "Registration confirmed: {event_title}".to_string(),
                ),
            ]),
        );

        templates.insert(
            "attendee_body".to_string(),
            HashMap::from([
                (
                    "kk".to_string(),
                    "<h1>Сәлеметсіз бе, {name}!</h1>\
                     <p>Сіз <strong>{event_title}</strong> іс-шарасына сәтті тіркелдіңіз.</p>\
                     <p>📍 {event_location}<br>🕒 {event_date}</p>\
                     {food_list}"
                        .to_string(),
                ),
                (
                    "en".to_string(),
                    "<h1>Hello, {name}!</h1>\
                     <p>You are registered for <strong>{event_title}</strong>.</p>\
                     <p>📍 {event_location}<br>🕒 {event_date}</p>\
                     {food_list}"
                        .to_string(),
                ),
            ]),
        );

        templates.insert(
            "organizer_subject".to_string(),
            HashMap::from([
                (
                    "kk".to_string(),
                    "Жаңа тіркеу: {event_title}".to_string(),
                ),
                (
                    "en".to_string(),
                    "New registration: {event_title}".to_string(),
                ),
            ]),
        );

        templates.insert(
            "organizer_body".to_string(),
            HashMap::from([
                (
                    "kk".to_string(),
                    "<h1>Сәлеметсіз бе, {name}!</h1>\
                     <p><strong>{attendee}</strong> {event_title} іс-шарасына тіркелді \
                     (қонақтар: {guest_count}).</p>\
                     <p>Барлық қатысушылар саны: {total_attendees}</p>\
                     {food_list}"
                        .to_string(),
                ),
                (
                    "en".to_string(),
                    "<h1>Hello, {name}!</h1>\
                     <p><strong>{attendee}</strong> registered for {event_title} \
                     ({guest_count} guests).</p>\
                     <p>Total attendees: {total_attendees}</p>\
                     {food_list}"
                        .to_string(),
                ),
            ]),
        );

        templates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::Settings;
    use chrono::Utc;
    use uuid::Uuid;

    fn test_event() -> Event {
        Event {
            id: Uuid::new_v4(),
            title_kk: "Наурыз той".to_string(),
            title_en: Some("Nauryz celebration".to_string()),
            description_kk: None,
            description_en: None,
            location: "Community hall".to_string(),
            image_url: None,
            start_date: Utc::now(),
            end_date: Utc::now(),
            max_attendees: Some(50),
            max_guests_per_registration: 4,
            organizer_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_disabled_without_api_key() {
        let service = EmailService::new(Settings::default().email).unwrap();
        assert!(!service.is_enabled());
    }

    #[test]
    fn test_attendee_confirmation_interpolates() {
        let service = EmailService::new(Settings::default().email).unwrap();
        let event = test_event();
        let message = service.attendee_confirmation(
            "member@example.org",
            "Aigerim",
            &event,
            &[("Бауырсақ".to_string(), 2)],
            "kk",
        );

        assert_eq!(message.to, "member@example.org");
        assert!(message.subject.contains("Наурыз той"));
        assert!(message.html.contains("Aigerim"));
        assert!(message.html.contains("Бауырсақ"));
        assert!(message.html.contains("× 2"));
    }

    #[test]
    fn test_unknown_language_falls_back_to_default() {
        let service = EmailService::new(Settings::default().email).unwrap();
        let event = test_event();
        let message =
            service.attendee_confirmation("member@example.org", "Dana", &event, &[], "fr");
        assert!(message.subject.contains("Тіркеу расталды"));
    }

    #[test]
    fn test_empty_food_list_renders_nothing() {
        assert_eq!(EmailService::format_food_list(&[]), "");
    }
}
