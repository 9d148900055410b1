//! Staff notification emails for each form.
//!
//! Submitted text is HTML-escaped before it is placed in the template, and
//! line breaks in free text become `<br>`.

use chrono::Utc;

use super::{EmailAttachment, Notification, OutgoingEmail};
use crate::models::{ContactForm, JoinForm, Plan, ProofOfPayment};

const FOOTER_STYLE: &str =
    "margin-top: 30px; padding-top: 20px; border-top: 1px solid #eee; color: #666; font-size: 12px;";
const HEADING_STYLE: &str = "color: #333; border-bottom: 2px solid #eee; padding-bottom: 10px;";
const SECTION_HEADING_STYLE: &str = "color: #555; margin-bottom: 15px;";
const QUOTE_STYLE: &str =
    "background-color: #f9f9f9; padding: 15px; border-left: 4px solid #007bff; margin: 10px 0;";

/// Escape submitted text for an HTML body.
///
/// `ammonia::clean_text` also encodes whitespace as numeric entities
/// (`&#32;`), so the email source is larger than the text but renders the
/// same.
fn escape(text: &str) -> String {
    ammonia::clean_text(text)
}

/// Escape free text, keeping its line breaks.
fn paragraphs(text: &str) -> String {
    text.lines().map(escape).collect::<Vec<_>>().join("<br>")
}

fn row(label: &str, value: &str) -> String {
    format!("<p><strong>{}:</strong> {}</p>", label, escape(value))
}

fn optional_row(label: &str, value: Option<&str>) -> String {
    value.map(|v| row(label, v)).unwrap_or_default()
}

fn wrap(title: &str, body: &str, footer: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="{HEADING_STYLE}">{title}</h2>
  {body}
  <div style="{FOOTER_STYLE}">{footer}</div>
</div>"#
    )
}

pub struct ContactNotification {
    pub form: ContactForm,
}

impl Notification for ContactNotification {
    fn compose(&self, from: &str, to: &str) -> OutgoingEmail {
        let form = &self.form;
        let body = format!(
            r#"<div style="margin: 20px 0;">{}{}<p><strong>Mensagem:</strong></p><div style="{QUOTE_STYLE}">{}</div></div>"#,
            row("Nome", &form.name),
            row("Email", &form.email),
            paragraphs(&form.message),
        );

        OutgoingEmail {
            from: from.to_owned(),
            to: to.to_owned(),
            subject: format!("Nova mensagem de contacto de {}", form.name),
            html: wrap(
                "Nova Mensagem de Contacto",
                &body,
                "<p>Esta mensagem foi enviada através do formulário de contacto do site APTM.</p>",
            ),
            reply_to: form.email.clone(),
            attachments: Vec::new(),
        }
    }

    fn log_mocked(&self) {
        tracing::info!(
            form = "contact",
            name = %self.form.name,
            email = %self.form.email,
            message = %self.form.message,
            "contact form submission (mock delivery)"
        );
    }
}

pub struct JoinNotification {
    pub form: JoinForm,
    pub proof: ProofOfPayment,
}

impl JoinNotification {
    fn plan_label(&self) -> String {
        Plan::from_wire(&self.form.plan).map_or_else(|| self.form.plan.clone(), |p| p.to_string())
    }
}

impl Notification for JoinNotification {
    fn compose(&self, from: &str, to: &str) -> OutgoingEmail {
        let form = &self.form;

        let personal = [
            row("Nome", &form.name),
            row("Email", &form.email),
            optional_row("Telemóvel", form.phone.as_deref()),
            row("Profissão", &form.profession),
            optional_row("Número da Cédula", form.registration_number.as_deref()),
            row("Distrito", &form.district),
            optional_row("Instituição", form.institution.as_deref()),
        ]
        .concat();

        let message = form
            .message
            .as_deref()
            .map(|m| {
                format!(
                    r#"<div style="margin: 20px 0;"><h3 style="{SECTION_HEADING_STYLE}">Mensagem</h3><div style="{QUOTE_STYLE}">{}</div></div>"#,
                    paragraphs(m)
                )
            })
            .unwrap_or_default();

        let body = format!(
            r#"<div style="margin: 20px 0;"><h3 style="{SECTION_HEADING_STYLE}">Dados Pessoais</h3>{personal}</div>
<div style="margin: 20px 0;"><h3 style="{SECTION_HEADING_STYLE}">Dados da Adesão</h3>{}<p><strong>Comprovativo:</strong> Em anexo</p></div>
{message}"#,
            row("Plano Escolhido", &self.plan_label()),
        );

        let footer = format!(
            "<p>Esta candidatura foi submetida através do formulário de adesão do site APTM.</p><p>Data de submissão: {}</p>",
            Utc::now().format("%d/%m/%Y, %H:%M:%S UTC")
        );

        OutgoingEmail {
            from: from.to_owned(),
            to: to.to_owned(),
            subject: format!("Nova candidatura de sócio: {}", form.name),
            html: wrap("Nova Candidatura de Sócio APTM", &body, &footer),
            reply_to: form.email.clone(),
            attachments: vec![EmailAttachment {
                filename: self.proof.filename.clone(),
                content_type: self.proof.content_type.clone(),
                content: self.proof.bytes.to_vec(),
            }],
        }
    }

    fn log_mocked(&self) {
        let form = &self.form;
        tracing::info!(
            form = "join",
            name = %form.name,
            email = %form.email,
            phone = form.phone.as_deref().unwrap_or("N/A"),
            profession = %form.profession,
            registration_number = form.registration_number.as_deref().unwrap_or("N/A"),
            district = %form.district,
            institution = form.institution.as_deref().unwrap_or("N/A"),
            plan = %form.plan,
            message = form.message.as_deref().unwrap_or("N/A"),
            file_name = %self.proof.filename,
            file_size = self.proof.size(),
            file_type = %self.proof.content_type,
            "join form submission (mock delivery)"
        );
    }
}
