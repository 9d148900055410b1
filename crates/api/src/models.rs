use std::{fmt, sync::LazyLock};

use axum::body::Bytes;
use garde::{Validate, rules::email::Email};
use regex::Regex;

use crate::validation::{FieldMap, JsonText};

/// Professions offered by the join form.
pub const PROFESSIONS: &[&str] = &[
    "Terapeuta da Mão",
    "Terapeuta Ocupacional",
    "Fisioterapeuta",
    "Cirurgião",
    "Outro",
];

/// Districts offered by the join form: mainland districts, then the islands
/// and island capitals of the autonomous regions.
pub const DISTRICTS: &[&str] = &[
    "Aveiro",
    "Beja",
    "Braga",
    "Bragança",
    "Castelo Branco",
    "Coimbra",
    "Évora",
    "Faro",
    "Guarda",
    "Leiria",
    "Lisboa",
    "Portalegre",
    "Porto",
    "Santarém",
    "Setúbal",
    "Viana do Castelo",
    "Vila Real",
    "Viseu",
    "Ilha da Graciosa",
    "Ilha da Madeira",
    "Ilha de Porto Santo",
    "Ilha de Santa Maria",
    "Ilha de São Jorge",
    "Ilha de São Miguel",
    "Ilha do Corvo",
    "Ilha do Faial",
    "Ilha do Pico",
    "Ilha Terceira",
    "Angra do Heroísmo",
    "Funchal",
];

/// Name of the multipart field carrying the proof of payment.
pub const PROOF_FIELD: &str = "comprovativo";

/// Message sent from the contact page.
///
/// Missing or `null` JSON fields read as empty strings so they are reported
/// by validation alongside every other issue instead of failing the parse.
#[derive(Debug, Clone, Default, Validate)]
pub struct ContactForm {
    #[garde(custom(person_name))]
    pub name: String,
    #[garde(custom(email_address))]
    pub email: String,
    #[garde(custom(contact_message))]
    pub message: String,
}

/// Contact form field names, in form order.
pub const CONTACT_FIELDS: FieldMap = &[
    ("name", "name"),
    ("email", "email"),
    ("message", "message"),
];

impl ContactForm {
    pub fn from_json(body: &mut JsonText) -> Self {
        Self {
            name: body.take("name"),
            email: body.take("email"),
            message: body.take("message"),
        }
    }
}

/// Text fields of a membership application.
///
/// Rust field names differ from the Portuguese form field names;
/// `JOIN_FIELDS` maps between them.
#[derive(Debug, Clone, Default, Validate)]
pub struct JoinForm {
    #[garde(custom(person_name))]
    pub name: String,
    #[garde(custom(email_address))]
    pub email: String,
    /// Portuguese mobile number: 9, then 1/2/3/6, then seven digits.
    #[garde(custom(mobile_phone))]
    pub phone: Option<String>,
    #[garde(custom(listed_profession))]
    pub profession: String,
    /// Professional licence (cédula) number.
    #[garde(custom(validate_registration_number))]
    pub registration_number: Option<String>,
    #[garde(custom(listed_district))]
    pub district: String,
    #[garde(custom(validate_institution))]
    pub institution: Option<String>,
    #[garde(custom(join_message))]
    pub message: Option<String>,
    #[garde(custom(known_plan))]
    pub plan: String,
}

/// Join form field names and the struct fields they fill, in form order.
pub const JOIN_FIELDS: FieldMap = &[
    ("nome", "name"),
    ("email", "email"),
    ("telemovel", "phone"),
    ("profissao", "profession"),
    ("numCedula", "registration_number"),
    ("distrito", "district"),
    ("instituicao", "institution"),
    ("mensagem", "message"),
    ("plano", "plan"),
];

impl JoinForm {
    /// Store a submitted form field. Unknown fields are ignored and empty
    /// optional fields count as absent.
    pub fn set(&mut self, wire_name: &str, value: String) {
        let optional = Some(value.clone()).filter(|v| !v.is_empty());

        match wire_name {
            "nome" => self.name = value,
            "email" => self.email = value,
            "telemovel" => self.phone = optional,
            "profissao" => self.profession = value,
            "numCedula" => self.registration_number = optional,
            "distrito" => self.district = value,
            "instituicao" => self.institution = optional,
            "mensagem" => self.message = optional,
            "plano" => self.plan = value,
            _ => {}
        }
    }
}

static MOBILE_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^9[1236][0-9]{7}$").expect("mobile phone pattern is valid"));

/// Length in UTF-16 code units, the way the browser counts it.
fn utf16_len(value: &str) -> usize {
    value.encode_utf16().count()
}

fn bounded(
    value: &str,
    (min, max): (usize, usize),
    too_short: &'static str,
    too_long: &'static str,
) -> garde::Result {
    match utf16_len(value) {
        len if len < min => Err(garde::Error::new(too_short)),
        len if len > max => Err(garde::Error::new(too_long)),
        _ => Ok(()),
    }
}

fn at_most(value: Option<&str>, max: usize, too_long: &'static str) -> garde::Result {
    match value {
        Some(v) if utf16_len(v) > max => Err(garde::Error::new(too_long)),
        _ => Ok(()),
    }
}

fn person_name(value: &str, _: &()) -> garde::Result {
    bounded(
        value,
        (2, 100),
        "O nome deve ter pelo menos 2 caracteres",
        "O nome não pode ter mais de 100 caracteres",
    )
}

fn email_address(value: &str, _: &()) -> garde::Result {
    if Email::validate_email(&value).is_err() {
        return Err(garde::Error::new("Por favor, introduza um email válido"));
    }
    at_most(Some(value), 255, "O email não pode ter mais de 255 caracteres")
}

fn contact_message(value: &str, _: &()) -> garde::Result {
    bounded(
        value,
        (10, 2000),
        "A mensagem deve ter pelo menos 10 caracteres",
        "A mensagem não pode ter mais de 2000 caracteres",
    )
}

fn mobile_phone(value: &Option<String>, _: &()) -> garde::Result {
    match value.as_deref() {
        Some(phone) if !MOBILE_PHONE.is_match(phone) => Err(garde::Error::new(
            "Telemóvel inválido. Deve começar com 9 e ter 9 dígitos",
        )),
        _ => Ok(()),
    }
}

fn validate_registration_number(value: &Option<String>, _: &()) -> garde::Result {
    at_most(
        value.as_deref(),
        50,
        "O número da cédula não pode ter mais de 50 caracteres",
    )
}

fn validate_institution(value: &Option<String>, _: &()) -> garde::Result {
    at_most(
        value.as_deref(),
        200,
        "A instituição não pode ter mais de 200 caracteres",
    )
}

fn join_message(value: &Option<String>, _: &()) -> garde::Result {
    at_most(
        value.as_deref(),
        1000,
        "A mensagem não pode ter mais de 1000 caracteres",
    )
}

fn listed_profession(value: &str, _: &()) -> garde::Result {
    if PROFESSIONS.contains(&value) {
        Ok(())
    } else {
        Err(garde::Error::new("Por favor, selecione uma profissão"))
    }
}

fn listed_district(value: &str, _: &()) -> garde::Result {
    if DISTRICTS.contains(&value) {
        Ok(())
    } else {
        Err(garde::Error::new("Por favor, selecione um distrito"))
    }
}

fn known_plan(value: &str, _: &()) -> garde::Result {
    match Plan::from_wire(value) {
        Some(_) => Ok(()),
        None if value.is_empty() => Err(garde::Error::new("Por favor, selecione um plano")),
        None => Err(garde::Error::new("Plano inválido")),
    }
}

/// Membership plan and its fee in euros.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    Semestral,
    Anual,
}

impl Plan {
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "semestral" => Some(Self::Semestral),
            "anual" => Some(Self::Anual),
            _ => None,
        }
    }

    pub fn fee_eur(self) -> u32 {
        match self {
            Self::Semestral => 85,
            Self::Anual => 150,
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Semestral => "Semestral",
            Self::Anual => "Anual",
        };
        write!(f, "{} (€{})", name, self.fee_eur())
    }
}

/// Uploaded proof of payment, held in memory until it is attached.
#[derive(Debug, Clone)]
pub struct ProofOfPayment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl ProofOfPayment {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}
