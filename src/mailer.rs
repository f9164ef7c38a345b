//! 報告書のメール送信

use crate::config::EmailSettings;
use crate::error::{ReportError, Result};
use crate::redmine::IssueSource;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, Message, SmtpTransport, Transport};

pub const REPORT_SUBJECT: &str = "Отчёт по сварке";
pub const REPORT_BODY: &str = "Прикреплённый отчёт во вложении.";

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const STARTTLS_PORT: u16 = 587;

pub struct Mailer {
    smtp: SmtpTransport,
    sender: Mailbox,
}

impl Mailer {
    pub fn new(settings: &EmailSettings) -> Result<Self> {
        if settings.smtp_server.trim().is_empty() {
            return Err(ReportError::Config("SMTPサーバーが設定されていません".into()));
        }

        let builder = if settings.port == STARTTLS_PORT {
            SmtpTransport::starttls_relay(&settings.smtp_server)
        } else {
            SmtpTransport::relay(&settings.smtp_server)
        }
        .map_err(|e| ReportError::Email(e.to_string()))?;

        let smtp = builder
            .port(settings.port)
            .credentials(Credentials::new(settings.username.clone(), settings.password.clone()))
            .build();

        Ok(Self {
            smtp,
            sender: sender_mailbox(settings)?,
        })
    }

    /// 添付付きメールを1通送る
    pub async fn send_report(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
        attachment: Vec<u8>,
        file_name: &str,
    ) -> Result<()> {
        let message = build_message(&self.sender, recipient, subject, body, attachment, file_name)?;
        let smtp = self.smtp.clone();

        tokio::task::spawn_blocking(move || smtp.send(&message))
            .await
            .map_err(|e| ReportError::Email(e.to_string()))?
            .map_err(|e| ReportError::Email(e.to_string()))?;

        tracing::info!(recipient, file_name, "メールを送信");
        Ok(())
    }
}

fn sender_mailbox(settings: &EmailSettings) -> Result<Mailbox> {
    let address: Address = settings
        .sender_email
        .parse()
        .map_err(|e| ReportError::Config(format!("送信元アドレスが不正です: {}", e)))?;
    let name = Some(settings.sender_name.clone()).filter(|n| !n.trim().is_empty());
    Ok(Mailbox::new(name, address))
}

pub fn build_message(
    sender: &Mailbox,
    recipient: &str,
    subject: &str,
    body: &str,
    attachment: Vec<u8>,
    file_name: &str,
) -> Result<Message> {
    let to: Mailbox = recipient
        .parse()
        .map_err(|e| ReportError::Email(format!("送信先アドレスが不正です: {}", e)))?;
    let content_type = ContentType::parse(XLSX_CONTENT_TYPE).map_err(|e| ReportError::Email(e.to_string()))?;

    Message::builder()
        .from(sender.clone())
        .to(to)
        .subject(subject)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(body.to_string()))
                .singlepart(Attachment::new(file_name.to_string()).body(attachment, content_type)),
        )
        .map_err(|e| ReportError::Email(e.to_string()))
}

/// 送信先（指定が無ければAPIキーの持ち主のアドレス）
pub async fn resolve_recipient<S: IssueSource>(source: &S, explicit: Option<&str>) -> Result<String> {
    if let Some(address) = explicit.map(str::trim).filter(|a| !a.is_empty()) {
        return Ok(address.to_string());
    }
    let user = source.current_user().await?;
    user.mail
        .filter(|m| !m.trim().is_empty())
        .ok_or(ReportError::MissingRecipient)
}
