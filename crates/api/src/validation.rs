//! Validation results shared by both forms.
//!
//! Field rules are declared with `garde` on the form structs in `models`.
//! Every violation is collected so the browser can show all of them at once.
//! The proof of payment is checked separately and first; a missing or
//! rejected file stops validation before the text fields are looked at.

use garde::Validate;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::{PROOF_FIELD, ProofOfPayment};

/// Largest accepted proof of payment (5 MiB).
pub const MAX_PROOF_BYTES: usize = 5 * 1024 * 1024;

pub const PROOF_CONTENT_TYPES: &[&str] =
    &["application/pdf", "image/jpeg", "image/jpg", "image/png"];

const NOT_TEXT: &str = "Este campo deve ser texto";

/// Form field names paired with the struct fields they fill, in the order
/// the form shows them. Issues are reported in this order.
pub type FieldMap = &'static [(&'static str, &'static str)];

/// One rejected field, named as it appears on the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub field: String,
    pub message: String,
}

impl Issue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationError {
    pub issues: Vec<Issue>,
}

impl ValidationError {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issues: vec![Issue::new(field, message)],
        }
    }

    /// Convert a garde report, renaming struct fields to form field names.
    pub fn from_report(report: &garde::Report, fields: FieldMap) -> Self {
        let issues = report
            .iter()
            .map(|(path, error)| {
                let path = path.to_string();
                let field = fields
                    .iter()
                    .find(|(_, rust)| *rust == path)
                    .map_or(path.as_str(), |(wire, _)| *wire);
                Issue::new(field, error.message())
            })
            .collect();

        Self::in_form_order(issues, fields)
    }

    /// Stable sort by form position; fields missing from the map go last.
    fn in_form_order(mut issues: Vec<Issue>, fields: FieldMap) -> Self {
        issues.sort_by_key(|issue| {
            fields
                .iter()
                .position(|(wire, _)| *wire == issue.field)
                .unwrap_or(fields.len())
        });

        Self { issues }
    }

    #[cfg(test)]
    pub fn fields(&self) -> Vec<&str> {
        self.issues.iter().map(|issue| issue.field.as_str()).collect()
    }
}

/// Text fields of a JSON object body.
///
/// Absent and `null` fields read as empty strings so the form rules report
/// them. A field holding any other JSON type also reads as empty, and is
/// reported as not being text instead.
pub struct JsonText {
    body: Map<String, Value>,
    issues: Vec<Issue>,
}

impl JsonText {
    /// Fails unless the body is a JSON object.
    pub fn parse(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        Ok(Self {
            body: serde_json::from_slice(bytes)?,
            issues: Vec::new(),
        })
    }

    pub fn take(&mut self, field: &str) -> String {
        match self.body.remove(field) {
            Some(Value::String(text)) => text,
            None | Some(Value::Null) => String::new(),
            Some(_) => {
                self.issues.push(Issue::new(field, NOT_TEXT));
                String::new()
            }
        }
    }

    /// Fields that held something other than text.
    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }
}

/// Run the declared field rules of a form.
pub fn check<T>(form: &T, fields: FieldMap) -> Result<(), ValidationError>
where
    T: Validate<Context = ()>,
{
    check_with(form, fields, Vec::new())
}

/// Run the declared field rules of a form on top of issues found while
/// reading it. A field that already has an issue is not checked again.
pub fn check_with<T>(form: &T, fields: FieldMap, found: Vec<Issue>) -> Result<(), ValidationError>
where
    T: Validate<Context = ()>,
{
    let mut issues = found;

    if let Err(report) = form.validate() {
        let reported = ValidationError::from_report(&report, fields).issues;
        let fresh: Vec<_> = reported
            .into_iter()
            .filter(|issue| !issues.iter().any(|known| known.field == issue.field))
            .collect();
        issues.extend(fresh);
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::in_form_order(issues, fields))
    }
}

/// Check the uploaded proof of payment: presence, then size, then type.
/// Only the first failing check is reported.
pub fn check_proof(proof: Option<ProofOfPayment>) -> Result<ProofOfPayment, ValidationError> {
    let Some(proof) = proof.filter(|p| p.size() > 0) else {
        return Err(ValidationError::single(
            PROOF_FIELD,
            "Por favor, selecione um comprovativo de pagamento",
        ));
    };

    if proof.size() > MAX_PROOF_BYTES {
        return Err(ValidationError::single(
            PROOF_FIELD,
            "O ficheiro não pode ter mais de 5MB",
        ));
    }

    if !PROOF_CONTENT_TYPES.contains(&proof.content_type.as_str()) {
        return Err(ValidationError::single(
            PROOF_FIELD,
            "Apenas ficheiros PDF, JPG e PNG são permitidos",
        ));
    }

    Ok(proof)
}
