use std::time::Duration;

use tracing::info;

use crate::error::DeliveryError;
use crate::settings::MailgunSettings;

/// Delivers an already-serialized payload.
pub trait Notifier {
    fn send(&self, payload: &str) -> Result<(), DeliveryError>;
}

/// Writes the payload to stdout instead of sending it.
pub struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn send(&self, payload: &str) -> Result<(), DeliveryError> {
        println!("{}", payload);
        Ok(())
    }
}

/// Sends the payload as the text body of a Mailgun sandbox message.
pub struct MailgunNotifier {
    client: reqwest::blocking::Client,
    settings: MailgunSettings,
    subject: String,
}

impl MailgunNotifier {
    pub fn new(settings: MailgunSettings, subject: &str, timeout: Duration) -> Result<Self, DeliveryError> {
        let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        Ok(MailgunNotifier {
            client,
            settings,
            subject: subject.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "https://api.mailgun.net/v3/sandbox{}.mailgun.org/messages",
            self.settings.sandbox_id
        )
    }

    fn form(&self, text: &str) -> Vec<(&'static str, String)> {
        let to = match &self.settings.recipient_name {
            Some(name) => format!("{} <{}>", name, self.settings.email_address),
            None => self.settings.email_address.clone(),
        };
        vec![
            (
                "from",
                format!("mailgun me <postmaster@sandbox{}.mailgun.org>", self.settings.sandbox_id),
            ),
            ("to", to),
            ("subject", self.subject.clone()),
            ("text", text.to_string()),
        ]
    }
}

impl Notifier for MailgunNotifier {
    fn send(&self, payload: &str) -> Result<(), DeliveryError> {
        let res = self
            .client
            .post(self.endpoint())
            .basic_auth("api", Some(&self.settings.api_key))
            .form(&self.form(payload))
            .send()?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().unwrap_or_default();
            return Err(DeliveryError::Rejected {
                code: status.as_u16(),
                body,
            });
        }
        info!(to = %self.settings.email_address, "Payload delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(name: Option<&str>) -> MailgunSettings {
        MailgunSettings {
            sandbox_id: "abc123".into(),
            api_key: "key-1".into(),
            email_address: "me@example.com".into(),
            recipient_name: name.map(str::to_string),
        }
    }

    #[test]
    fn endpoint_uses_sandbox() {
        let n = MailgunNotifier::new(settings(None), "s", Duration::from_secs(5)).unwrap();
        assert_eq!(n.endpoint(), "https://api.mailgun.net/v3/sandboxabc123.mailgun.org/messages");
    }

    #[test]
    fn form_fields() {
        let n = MailgunNotifier::new(settings(Some("Justin")), "Popular movies", Duration::from_secs(5)).unwrap();
        let form = n.form(r#"{"movies":[]}"#);
        assert_eq!(
            form,
            vec![
                ("from", "mailgun me <postmaster@sandboxabc123.mailgun.org>".to_string()),
                ("to", "Justin <me@example.com>".to_string()),
                ("subject", "Popular movies".to_string()),
                ("text", r#"{"movies":[]}"#.to_string()),
            ]
        );
    }

    #[test]
    fn bare_recipient_without_name() {
        let n = MailgunNotifier::new(settings(None), "s", Duration::from_secs(5)).unwrap();
        assert_eq!(n.form("x")[1], ("to", "me@example.com".to_string()));
    }
}
