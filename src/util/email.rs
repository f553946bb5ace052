use crate::config::{SmtpConfig, SmtpTls, ConfigError};
use crate::dto::submission_dto::TemplateParams;
use crate::util::notifier::{Notifier, NotifyError};
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
};
use tracing::{error, info, instrument};
use validator::ValidateEmail;

/// Email service errors
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("SMTP error: {0}")]
    SmtpError(String),

    #[error("Message building error: {0}")]
    MessageError(String),

    #[error("Address error: {0}")]
    AddressError(String),
}

impl From<ConfigError> for EmailError {
    fn from(err: ConfigError) -> Self {
        EmailError::ConfigError(err.to_string())
    }
}

impl From<EmailError> for NotifyError {
    fn from(err: EmailError) -> Self {
        match err {
            EmailError::SmtpError(msg) => NotifyError::Transport(msg),
            other => NotifyError::Message(other.to_string()),
        }
    }
}

/// Mails submissions straight through an SMTP relay.
pub struct SmtpEmailService {
    pub config: SmtpConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailService {
    #[instrument(skip(config), fields(host = %config.host, port = config.port))]
    pub fn new(config: SmtpConfig) -> Result<Self, EmailError> {
        info!("Initializing SMTP email service");

        config.validate()?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            .port(config.port)
            .timeout(Some(std::time::Duration::from_secs(config.connection_timeout_secs)));

        let tls = match config.tls {
            SmtpTls::None => Tls::None,
            mode => {
                let parameters = TlsParameters::new(config.host.clone())
                    .map_err(|e| EmailError::ConfigError(format!("TLS configuration error: {}", e)))?;
                if mode == SmtpTls::StartTls {
                    Tls::Required(parameters)
                } else {
                    Tls::Wrapper(parameters)
                }
            }
        };
        builder = builder.tls(tls);

        if config.has_credentials() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        let transport = builder.build();
        info!("SMTP email service initialized successfully");
        Ok(Self { config, transport })
    }

    /// Send the submission email for `params` to `params.to_email`.
    #[instrument(skip(self, params), fields(to = %params.to_email, subject = %params.title))]
    pub async fn send_submission(&self, params: &TemplateParams) -> Result<(), EmailError> {
        validate_email_address(&params.to_email)?;
        let message = self.build_message(params)?;

        self.transport.send(message).await.map_err(|e| {
            error!("Failed to send email: {}", e);
            EmailError::SmtpError(format!("Failed to send email: {}", e))
        })?;

        info!("Submission email sent");
        Ok(())
    }

    fn build_message(&self, params: &TemplateParams) -> Result<Message, EmailError> {
        let from: Mailbox = format!("{} <{}>", self.config.from_name, self.config.from_email)
            .parse()
            .map_err(|e| EmailError::AddressError(format!("Invalid from address: {}", e)))?;
        let to: Mailbox = params
            .to_email
            .parse()
            .map_err(|e| EmailError::AddressError(format!("Invalid to address: {}", e)))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(&params.title)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(render_text_body(params)),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(render_html_body(params)),
                    ),
            )
            .map_err(|e| EmailError::MessageError(format!("Failed to build multipart message: {}", e)))
    }
}

#[async_trait]
impl Notifier for SmtpEmailService {
    async fn dispatch(&self, params: &TemplateParams) -> Result<(), NotifyError> {
        self.send_submission(params).await.map_err(NotifyError::from)
    }
}

pub fn render_text_body(params: &TemplateParams) -> String {
    let photos: Vec<String> = params.photo_urls().map(|url| format!("- {}", url)).collect();
    format!(
        "{title}\n\nName: {name}\nPhone: {phone}\nCar model: {model}\nCar year: {year}\n\nPhotos:\n{photos}\n",
        title = params.title,
        name = params.name,
        phone = params.phone_number,
        model = params.car_model,
        year = params.car_year,
        photos = photos.join("\n"),
    )
}

pub fn render_html_body(params: &TemplateParams) -> String {
    let photos: String = params
        .photo_urls()
        .map(|url| {
            let url = html_escape::encode_double_quoted_attribute(url);
            format!(r#"<li><a href="{url}">{url}</a></li>"#, url = url)
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>{title}</title></head>
<body style="font-family: Arial, sans-serif; color: #333;">
    <h2>{title}</h2>
    <table>
        <tr><td><strong>Name</strong></td><td>{name}</td></tr>
        <tr><td><strong>Phone</strong></td><td>{phone}</td></tr>
        <tr><td><strong>Car model</strong></td><td>{model}</td></tr>
        <tr><td><strong>Car year</strong></td><td>{year}</td></tr>
    </table>
    <h3>Photos</h3>
    <ul>{photos}</ul>
</body>
</html>"#,
        title = html_escape::encode_text(&params.title),
        name = html_escape::encode_text(&params.name),
        phone = html_escape::encode_text(&params.phone_number),
        model = html_escape::encode_text(&params.car_model),
        year = html_escape::encode_text(&params.car_year),
        photos = photos,
    )
}

fn validate_email_address(email: &str) -> Result<(), EmailError> {
    if !email.validate_email() {
        return Err(EmailError::AddressError(format!("Invalid email format: '{}'", email)));
    }
    Ok(())
}
