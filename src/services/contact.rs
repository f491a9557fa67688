use crate::config::MailConfig;
use crate::error::{AppError, Result};
use crate::mail::{MailTransport, OutboundEmail};
use crate::models::ContactRequest;

/// Contact form relay: validate, sanitize, render, dispatch
pub struct ContactService;

/// Submission fields after escaping, safe to interpolate into HTML
#[derive(Debug, Clone)]
struct SanitizedContact {
    name: String,
    email: String,
    phone: String,
    service: String,
    message: String,
}

impl ContactService {
    /// Validate a submission, then send the operator notification
    /// followed by the submitter acknowledgment. Sends are sequential
    /// and the call only succeeds if both complete.
    pub async fn submit(
        mailer: &dyn MailTransport,
        mail: &MailConfig,
        req: ContactRequest,
    ) -> Result<()> {
        // Invalid input halts the relay before anything is composed or
        // sent. The behavior this replaces flagged the failure but kept
        // sending anyway; that was a missing early return.
        if req.name.trim().is_empty() || req.message.trim().is_empty()
            || !is_valid_email(&req.email)
        {
            return Err(AppError::BadRequest(
                "Name, email, and message are required and must be valid.".to_string(),
            ));
        }

        let recipient = req.email.clone();
        let safe = sanitize(&req);

        let operator = OutboundEmail {
            from: mail.sender.clone(),
            to: mail.receiver.clone(),
            subject: "New Contact Form Submission".to_string(),
            html: render_operator_html(&safe),
            text: render_operator_text(&safe),
        };

        let acknowledgment = OutboundEmail {
            from: mail.sender.clone(),
            to: recipient,
            subject: "Thank you for your submission".to_string(),
            html: render_acknowledgment_html(&safe),
            text: render_acknowledgment_text(&safe),
        };

        mailer.send(&operator).await?;
        mailer.send(&acknowledgment).await?;

        Ok(())
    }
}

fn sanitize(req: &ContactRequest) -> SanitizedContact {
    SanitizedContact {
        name: escape_html(&title_case(&req.name)),
        email: escape_html(&req.email),
        phone: req.phone_number.as_deref().map(escape_html).unwrap_or_default(),
        service: req.service.as_deref().map(escape_html).unwrap_or_default(),
        message: escape_html(&req.message),
    }
}

/// Entity-encode the characters meaningful in HTML
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

/// Capitalize the first letter of each whitespace-separated word
fn title_case(input: &str) -> String {
    input
        .to_lowercase()
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Basic local@domain.tld shape check
fn is_valid_email(email: &str) -> bool {
    if email.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((name, tld)) => !name.is_empty() && !tld.is_empty(),
        None => false,
    }
}

fn render_operator_html(safe: &SanitizedContact) -> String {
    let row = |label: &str, value: &str| {
        format!(
            "<tr><td style=\"padding: 12px; font-weight: bold;\">{}</td>\
             <td style=\"padding: 12px;\">{}</td></tr>",
            label, value
        )
    };

    let service_row = if safe.service.is_empty() {
        String::new()
    } else {
        row("Service:", &safe.service)
    };

    format!(
        "<!DOCTYPE html>\
         <html><body style=\"font-family: Arial, sans-serif; color: #333;\">\
         <div style=\"max-width: 900px; margin: 0 auto; background-color: #ffffff;\">\
         <div style=\"background-color: #2c3e50; color: #ffffff; padding: 20px;\">\
         <h2 style=\"margin: 0;\">New Contact Form Submission</h2></div>\
         <table style=\"width: 100%; border-collapse: collapse;\">\
         {}{}{}{}{}\
         </table>\
         <div style=\"padding: 15px; text-align: center; font-size: 12px; color: #777;\">\
         This message was sent via your website contact form.</div>\
         </div></body></html>",
        row("Name:", &safe.name),
        row("Email:", &safe.email),
        row("Phone:", &safe.phone),
        service_row,
        row("Message:", &safe.message),
    )
}

fn render_operator_text(safe: &SanitizedContact) -> String {
    let mut text = format!(
        "New submission:\nName: {}\nEmail: {}\nPhone: {}\n",
        safe.name,
        safe.email,
        if safe.phone.is_empty() { "N/A" } else { &safe.phone },
    );
    if !safe.service.is_empty() {
        text.push_str(&format!("Service: {}\n", safe.service));
    }
    text.push_str(&format!("Message: {}", safe.message));
    text
}

fn render_acknowledgment_html(safe: &SanitizedContact) -> String {
    format!(
        "<!DOCTYPE html>\
         <html><body style=\"font-family: Arial, sans-serif;\">\
         <div style=\"max-width: 80%; margin: 40px auto; border-radius: 10px; overflow: hidden;\">\
         <div style=\"background-color: #2c3e50; color: white; padding: 30px; text-align: center;\">\
         <h1 style=\"margin: 0;\">Thank You, {}!</h1>\
         <p>I've received your message</p></div>\
         <div style=\"padding: 10px 25px; background-color: #ffffff; color: black;\">\
         <p>Dear <strong>{}</strong>,</p>\
         <p>Thank you for reaching out. I will carefully review your message \
         and get back to you as soon as possible.</p>\
         <p style=\"margin-top: 25px;\">Best regards,<br/><strong>Tarek Monowar</strong></p>\
         </div></div></body></html>",
        safe.name, safe.name,
    )
}

fn render_acknowledgment_text(safe: &SanitizedContact) -> String {
    format!(
        "Dear {},\n\n\
         Thank you for contacting us! We received your message and will get back to you shortly.\n\n\
         Best regards,\nTarek Monowar",
        safe.name,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::test_util::RecordingMailer;

    fn mail_config() -> MailConfig {
        MailConfig {
            sender: "relay@example.com".to_string(),
            receiver: "operator@example.com".to_string(),
            ..MailConfig::default()
        }
    }

    fn submission() -> ContactRequest {
        ContactRequest {
            name: "jane doe".to_string(),
            email: "jane@example.com".to_string(),
            phone_number: None,
            message: "hello <b>".to_string(),
            service: None,
        }
    }

    #[test]
    fn escapes_html_entities() {
        assert_eq!(
            escape_html("a & b < c > d \" e ' f"),
            "a &amp; b &lt; c &gt; d &quot; e &#39; f"
        );
    }

    #[test]
    fn title_cases_each_word() {
        assert_eq!(title_case("jane doe"), "Jane Doe");
        assert_eq!(title_case("  MIXED   caSe  "), "Mixed Case");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn validates_email_shape() {
        assert!(is_valid_email("jane@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.org"));
        assert!(!is_valid_email("plainaddress"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("jane doe@example.com"));
        assert!(!is_valid_email("jane@exam ple.com"));
    }

    #[tokio::test]
    async fn sends_operator_then_acknowledgment() {
        let mailer = RecordingMailer::new();

        ContactService::submit(&mailer, &mail_config(), submission())
            .await
            .unwrap();

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "operator@example.com");
        assert_eq!(sent[0].subject, "New Contact Form Submission");
        assert_eq!(sent[1].to, "jane@example.com");
        assert_eq!(sent[1].subject, "Thank you for your submission");
    }

    #[tokio::test]
    async fn operator_body_is_sanitized() {
        let mailer = RecordingMailer::new();

        ContactService::submit(&mailer, &mail_config(), submission())
            .await
            .unwrap();

        let sent = mailer.sent.lock().unwrap();
        let body = &sent[0].html;
        assert!(body.contains("Jane Doe"));
        assert!(body.contains("hello &lt;b&gt;"));
        assert!(!body.contains("hello <b>"));
    }

    #[tokio::test]
    async fn invalid_submission_sends_nothing() {
        let mailer = RecordingMailer::new();

        let req = ContactRequest {
            email: "not-an-email".to_string(),
            ..submission()
        };
        let err = ContactService::submit(&mailer, &mail_config(), req)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_message_sends_nothing() {
        let mailer = RecordingMailer::new();

        let req = ContactRequest {
            message: "   ".to_string(),
            ..submission()
        };
        let err = ContactService::submit(&mailer, &mail_config(), req)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_aborts_remaining_sends() {
        let mailer = RecordingMailer::failing_after(1);

        let err = ContactService::submit(&mailer, &mail_config(), submission())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Mail(_)));
        // Only the operator message went out before the failure
        assert_eq!(mailer.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn acknowledgment_greets_formatted_name() {
        let mailer = RecordingMailer::new();

        ContactService::submit(&mailer, &mail_config(), submission())
            .await
            .unwrap();

        let sent = mailer.sent.lock().unwrap();
        assert!(sent[1].html.contains("Thank You, Jane Doe!"));
        assert!(sent[1].text.contains("Dear Jane Doe,"));
    }
}
