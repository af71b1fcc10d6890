// src/services/email.rs
//! Transactional email dispatch. The HTML body is rendered exactly once per
//! invocation; delivery goes through the SendGrid HTTP API when a key is
//! configured and falls back to direct SMTP submission on failure. At most
//! one visible send happens per call and nothing is queued or retried.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use reqwest::Client;
use thiserror::Error;
use tracing::{info, warn};

use crate::common::config::{AppConfig, SmtpConfig};

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("email API request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("email API returned status {0}")]
    Provider(u16),
    #[error("invalid mailbox: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("smtp delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// The message kinds this site sends, with their payload fields.
#[derive(Debug, Clone)]
pub enum EmailTemplate {
    PasswordReset {
        code: String,
    },
    Welcome {
        username: String,
    },
    // No route triggers this yet; kept for the session-alert feature.
    #[allow(dead_code)]
    LoginAlert {
        device: String,
        location: String,
        time: String,
    },
    PasswordChanged {
        time: String,
    },
    Contact {
        name: String,
        email: String,
        message: String,
    },
}

pub struct EmailService {
    http: Client,
    sendgrid_api_key: Option<String>,
    smtp: SmtpConfig,
    site_name: String,
    login_url: String,
}

impl EmailService {
    pub fn new(http: Client, config: &AppConfig) -> Self {
        Self {
            http,
            sendgrid_api_key: config.sendgrid_api_key.clone(),
            smtp: config.smtp.clone(),
            site_name: config.site_name.clone(),
            login_url: config.login_url.clone(),
        }
    }

    /// Render the template and deliver it to one recipient.
    pub async fn dispatch(&self, to: &str, template: EmailTemplate) -> Result<(), EmailError> {
        let subject = self.subject_for(&template);
        let html = self.render(&template);
        self.deliver(to, &subject, &html).await
    }

    async fn deliver(&self, to: &str, subject: &str, html: &str) -> Result<(), EmailError> {
        if let Some(key) = &self.sendgrid_api_key {
            match self.send_via_sendgrid(key, to, subject, html).await {
                Ok(()) => {
                    info!(subject = subject, "Email delivered via SendGrid");
                    return Ok(());
                }
                Err(e) => {
                    warn!(error = %e, "SendGrid delivery failed, falling back to SMTP");
                }
            }
        }

        self.send_via_smtp(to, subject, html).await?;
        info!(subject = subject, "Email delivered via SMTP");
        Ok(())
    }

    async fn send_via_sendgrid(
        &self,
        api_key: &str,
        to: &str,
        subject: &str,
        html: &str,
    ) -> Result<(), EmailError> {
        let body = serde_json::json!({
            "personalizations": [{ "to": [{ "email": to }] }],
            "from": {
                "email": self.smtp.from_email,
                "name": self.smtp.from_name,
            },
            "subject": subject,
            "content": [{ "type": "text/html", "value": html }],
        });

        let resp = self
            .http
            .post(SENDGRID_SEND_URL)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(EmailError::Provider(resp.status().as_u16()));
        }

        Ok(())
    }

    async fn send_via_smtp(&self, to: &str, subject: &str, html: &str) -> Result<(), EmailError> {
        let from_address: Address = self.smtp.from_email.parse()?;
        let message = Message::builder()
            .from(Mailbox::new(Some(self.smtp.from_name.clone()), from_address))
            .to(to.parse::<Mailbox>()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.smtp.host)?
            .port(self.smtp.port)
            .credentials(Credentials::new(
                self.smtp.username.clone(),
                self.smtp.password.clone(),
            ))
            .build();

        mailer.send(message).await?;
        Ok(())
    }

    // ========================================================================
    // Templates
    // ========================================================================

    pub fn subject_for(&self, template: &EmailTemplate) -> String {
        match template {
            EmailTemplate::PasswordReset { .. } => {
                format!("Password Reset Code - {}", self.site_name)
            }
            EmailTemplate::Welcome { .. } => format!("Welcome to {}!", self.site_name),
            EmailTemplate::LoginAlert { .. } => {
                format!("New Login Detected - {}", self.site_name)
            }
            EmailTemplate::PasswordChanged { .. } => {
                format!("Password Changed - {}", self.site_name)
            }
            EmailTemplate::Contact { name, .. } => {
                format!("New Contact Message from {}", name)
            }
        }
    }

    pub fn render(&self, template: &EmailTemplate) -> String {
        let content = match template {
            EmailTemplate::PasswordReset { code } => format!(
                "<h2>Password Reset Request</h2>\
                 <p>Hello,</p>\
                 <p>We received a request to reset your password for your {site} account. \
                 Use the following code to complete your password reset:</p>\
                 <div class=\"code\">{code}</div>\
                 <p>This code will expire in 15 minutes for security reasons.</p>\
                 <p><strong>Note:</strong> If you didn't request this reset, please secure \
                 your account and contact us immediately.</p>",
                site = self.site_name,
                code = escape_html(code),
            ),
            EmailTemplate::Welcome { username } => format!(
                "<h2>Welcome to {site}!</h2>\
                 <p>Hello {username},</p>\
                 <p>Welcome to {site}! You're now part of our community of cybersecurity \
                 enthusiasts.</p>\
                 <p>Get started by exploring our:</p>\
                 <ul>\
                 <li>Training Videos</li>\
                 <li>Security Tools</li>\
                 <li>Technical Blogs</li>\
                 <li>Writeups</li>\
                 </ul>\
                 <a href=\"{login_url}\" class=\"button\">Access Your Account</a>",
                site = self.site_name,
                username = escape_html(username),
                login_url = self.login_url,
            ),
            EmailTemplate::LoginAlert {
                device,
                location,
                time,
            } => format!(
                "<h2>New Login Detected</h2>\
                 <p>Hello,</p>\
                 <p>We detected a new login to your {site} account from:</p>\
                 <ul>\
                 <li>Device: {device}</li>\
                 <li>Location: {location}</li>\
                 <li>Time: {time}</li>\
                 </ul>\
                 <p>If this wasn't you, please secure your account immediately by resetting \
                 your password.</p>",
                site = self.site_name,
                device = escape_html(device),
                location = escape_html(location),
                time = escape_html(time),
            ),
            EmailTemplate::PasswordChanged { time } => format!(
                "<h2>Password Successfully Changed</h2>\
                 <p>Hello,</p>\
                 <p>Your password was successfully changed on {time}.</p>\
                 <p>If you did not make this change, please contact us immediately.</p>",
                time = escape_html(time),
            ),
            EmailTemplate::Contact {
                name,
                email,
                message,
            } => format!(
                "<h2>New Contact Message</h2>\
                 <p><strong>From:</strong> {name} ({email})</p>\
                 <p><strong>Message:</strong></p>\
                 <div style=\"white-space:pre-wrap;border:1px solid #eee;padding:12px;\
                 border-radius:6px;\">{message}</div>",
                name = escape_html(name),
                email = escape_html(email),
                message = escape_html(message),
            ),
        };

        BASE_TEMPLATE
            .replace("{SITE_NAME}", &self.site_name)
            .replace("{CONTENT}", &content)
    }
}

/// Wrapper layout shared by every message. `{CONTENT}` is substituted with
/// the rendered template body, so the CSS braces stay out of `format!`.
const BASE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <style>
        body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; }
        .container { max-width: 600px; margin: 0 auto; padding: 20px; }
        .header { text-align: center; padding: 20px 0; font-size: 22px; font-weight: bold; }
        .content { background: #f9f9f9; padding: 20px; border-radius: 8px; }
        .footer { text-align: center; padding: 20px 0; font-size: 12px; color: #666; }
        .button {
            display: inline-block;
            padding: 12px 24px;
            background: #4F46E5;
            color: white;
            text-decoration: none;
            border-radius: 4px;
            margin: 20px 0;
        }
        .code {
            font-size: 24px;
            font-weight: bold;
            letter-spacing: 4px;
            text-align: center;
            padding: 15px;
            background: #e9ecef;
            border-radius: 4px;
            margin: 15px 0;
        }
    </style>
</head>
<body>
    <div class="container">
        <div class="header">{SITE_NAME}</div>
        <div class="content">
            {CONTENT}
        </div>
        <div class="footer">
            <p>© 2025 {SITE_NAME}. All rights reserved.</p>
            <p>If you didn't request this email, please ignore it or contact support.</p>
        </div>
    </div>
</body>
</html>"#;

/// Minimal HTML escaping for user-supplied text interpolated into templates.
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::SmtpConfig;

    fn service() -> EmailService {
        EmailService {
            http: Client::new(),
            sendgrid_api_key: None,
            smtp: SmtpConfig {
                host: "smtp.example.com".to_string(),
                port: 587,
                username: "mailer".to_string(),
                password: "secret".to_string(),
                from_email: "noreply@example.com".to_string(),
                from_name: "Alma101".to_string(),
            },
            site_name: "Alma101".to_string(),
            login_url: "https://alma101.example/auth".to_string(),
        }
    }

    #[test]
    fn test_password_reset_template_contains_code() {
        let svc = service();
        let html = svc.render(&EmailTemplate::PasswordReset {
            code: "482913".to_string(),
        });
        assert!(html.contains("482913"));
        assert!(html.contains("expire in 15 minutes"));
        assert_eq!(
            svc.subject_for(&EmailTemplate::PasswordReset {
                code: "482913".to_string()
            }),
            "Password Reset Code - Alma101"
        );
    }

    #[test]
    fn test_contact_template_escapes_user_input() {
        let svc = service();
        let html = svc.render(&EmailTemplate::Contact {
            name: "<script>alert(1)</script>".to_string(),
            email: "a@b.com".to_string(),
            message: "hello & goodbye".to_string(),
        });
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("hello &amp; goodbye"));
    }

    #[test]
    fn test_welcome_template_links_login_url() {
        let svc = service();
        let html = svc.render(&EmailTemplate::Welcome {
            username: "casey".to_string(),
        });
        assert!(html.contains("https://alma101.example/auth"));
        assert!(html.contains("casey"));
    }

    #[test]
    fn test_login_alert_template_lists_device_details() {
        let svc = service();
        let html = svc.render(&EmailTemplate::LoginAlert {
            device: "Firefox on Linux".to_string(),
            location: "Nairobi".to_string(),
            time: "2025-01-01 10:00:00".to_string(),
        });
        assert!(html.contains("Firefox on Linux"));
        assert!(html.contains("Nairobi"));
    }
}
