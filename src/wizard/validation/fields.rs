//! The declarative per-field rule table.
//!
//! Each [`FieldId`] names one form field and carries exactly one
//! [`FieldRule`]; real-time validation and the step validators both evaluate
//! this table, so a rule like "first name must be 2-50 letters" exists in one
//! place only. The enum is closed: an unhandled field name cannot fall
//! through silently.

use chrono::NaiveDate;

use super::ValidationError;
use super::ValidationWarning;
use crate::calendar::age_in_years;
use crate::wizard::roster::MemberId;

/// Closed set of validated text/date fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    FirstName,
    MiddleName,
    LastName,
    Email,
    Phone,
    Address,
    Occupation,
    PassportNumber,
    PlaceOfBirth,
    CountryOfBirth,
    DateOfBirth,
    PassportExpiry,
}

impl FieldId {
    pub const fn key(self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::MiddleName => "middle_name",
            Self::LastName => "last_name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Address => "address",
            Self::Occupation => "occupation",
            Self::PassportNumber => "passport_number",
            Self::PlaceOfBirth => "place_of_birth",
            Self::CountryOfBirth => "country_of_birth",
            Self::DateOfBirth => "date_of_birth",
            Self::PassportExpiry => "passport_expiry",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::FirstName => "First name",
            Self::MiddleName => "Middle name",
            Self::LastName => "Last name",
            Self::Email => "Email address",
            Self::Phone => "Phone number",
            Self::Address => "Address",
            Self::Occupation => "Occupation",
            Self::PassportNumber => "Passport number",
            Self::PlaceOfBirth => "Place of birth",
            Self::CountryOfBirth => "Country of birth",
            Self::DateOfBirth => "Date of birth",
            Self::PassportExpiry => "Passport expiry date",
        }
    }

    pub const fn rule(self) -> &'static FieldRule {
        match self {
            Self::FirstName => &FIRST_NAME,
            Self::MiddleName => &MIDDLE_NAME,
            Self::LastName => &LAST_NAME,
            Self::Email => &EMAIL,
            Self::Phone => &PHONE,
            Self::Address => &ADDRESS,
            Self::Occupation => &OCCUPATION,
            Self::PassportNumber => &PASSPORT_NUMBER,
            Self::PlaceOfBirth => &PLACE_OF_BIRTH,
            Self::CountryOfBirth => &COUNTRY_OF_BIRTH,
            Self::DateOfBirth => &DATE_FIELD,
            Self::PassportExpiry => &DATE_FIELD,
        }
    }
}

/// Error key for a field belonging to a family member, e.g.
/// `family_members.3.date_of_birth`.
pub fn member_field_key(member: MemberId, field: FieldId) -> String {
    format!("family_members.{}.{}", member.0, field.key())
}

/// Validation scopes a rule participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    RealTime,
    Step,
    FullForm,
}

pub const ALL_SCOPES: &[Scope] = &[Scope::RealTime, Scope::Step, Scope::FullForm];
/// Date fields are entered through pickers and parsed before they reach the
/// table, so their presence rule only fires at step boundaries.
pub const STEP_SCOPES: &[Scope] = &[Scope::Step, Scope::FullForm];

/// Character class a text field must match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Letters plus the punctuation that occurs in human names.
    Name,
    /// ASCII letters and digits only.
    Alphanumeric,
    /// Structural email shape: one `@`, dotted domain, no whitespace.
    Email,
    /// National short form (`09`/`07` + 8 digits) or `+` international form.
    Phone,
    /// Anything printable.
    FreeText,
}

impl CharClass {
    fn matches(self, value: &str) -> bool {
        match self {
            CharClass::Name => value
                .chars()
                .all(|c| c.is_alphabetic() || matches!(c, ' ' | '-' | '\'' | '.')),
            CharClass::Alphanumeric => {
                value.chars().all(|c| c.is_ascii_alphanumeric())
            }
            CharClass::Email => {
                let mut parts = value.split('@');
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(local), Some(domain), None) => {
                        !local.is_empty()
                            && !domain.is_empty()
                            && domain.contains('.')
                            && !domain.starts_with('.')
                            && !domain.ends_with('.')
                            && !value.chars().any(char::is_whitespace)
                    }
                    _ => false,
                }
            }
            CharClass::Phone => {
                if let Some(rest) = value.strip_prefix('+') {
                    (10..=14).contains(&rest.len())
                        && rest.chars().all(|c| c.is_ascii_digit())
                } else {
                    value.len() == 10
                        && (value.starts_with("09") || value.starts_with("07"))
                        && value.chars().all(|c| c.is_ascii_digit())
                }
            }
            CharClass::FreeText => !value.chars().any(char::is_control),
        }
    }

    fn violation_message(self, field: FieldId) -> String {
        match self {
            CharClass::Name => format!(
                "{} may only contain letters, spaces, hyphens, apostrophes, and periods",
                field.label()
            ),
            CharClass::Alphanumeric => {
                format!("{} may only contain letters and digits", field.label())
            }
            CharClass::Email => "Email address is not well formed".to_string(),
            CharClass::Phone => {
                "Phone number must be 09/07 followed by 8 digits, or + followed by 10-14 digits"
                    .to_string()
            }
            CharClass::FreeText => {
                format!("{} contains unprintable characters", field.label())
            }
        }
    }
}

/// One declarative rule: presence, length bounds, character class, scopes.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub required: bool,
    pub min_len: usize,
    pub max_len: usize,
    pub class: CharClass,
    pub scopes: &'static [Scope],
}

impl FieldRule {
    pub fn applies_to(&self, scope: Scope) -> bool {
        self.scopes.contains(&scope)
    }
}

const FIRST_NAME: FieldRule = FieldRule {
    required: true,
    min_len: 2,
    max_len: 50,
    class: CharClass::Name,
    scopes: ALL_SCOPES,
};
const MIDDLE_NAME: FieldRule = FieldRule {
    required: false,
    min_len: 2,
    max_len: 50,
    class: CharClass::Name,
    scopes: ALL_SCOPES,
};
const LAST_NAME: FieldRule = FieldRule {
    required: true,
    min_len: 2,
    max_len: 50,
    class: CharClass::Name,
    scopes: ALL_SCOPES,
};
const EMAIL: FieldRule = FieldRule {
    required: true,
    min_len: 5,
    max_len: 100,
    class: CharClass::Email,
    scopes: ALL_SCOPES,
};
const PHONE: FieldRule = FieldRule {
    required: true,
    min_len: 10,
    max_len: 15,
    class: CharClass::Phone,
    scopes: ALL_SCOPES,
};
const ADDRESS: FieldRule = FieldRule {
    required: true,
    min_len: 5,
    max_len: 200,
    class: CharClass::FreeText,
    scopes: ALL_SCOPES,
};
const OCCUPATION: FieldRule = FieldRule {
    required: false,
    min_len: 2,
    max_len: 100,
    class: CharClass::Name,
    scopes: ALL_SCOPES,
};
const PASSPORT_NUMBER: FieldRule = FieldRule {
    required: true,
    min_len: 6,
    max_len: 20,
    class: CharClass::Alphanumeric,
    scopes: ALL_SCOPES,
};
const PLACE_OF_BIRTH: FieldRule = FieldRule {
    required: true,
    min_len: 2,
    max_len: 100,
    class: CharClass::Name,
    scopes: ALL_SCOPES,
};
const COUNTRY_OF_BIRTH: FieldRule = FieldRule {
    required: true,
    min_len: 2,
    max_len: 60,
    class: CharClass::Name,
    scopes: ALL_SCOPES,
};
// Only presence is a text-level concern for dates; age and expiry
// constraints live in the date validators below.
const DATE_FIELD: FieldRule = FieldRule {
    required: true,
    min_len: 0,
    max_len: 32,
    class: CharClass::FreeText,
    scopes: STEP_SCOPES,
};

/// Validate one field against the rule table within a given scope. Pure:
/// same input, same answer, every time.
pub fn validate_field_in(scope: Scope, field: FieldId, value: &str) -> Option<ValidationError> {
    let rule = field.rule();
    if !rule.applies_to(scope) {
        return None;
    }

    let trimmed = value.trim();
    if trimmed.is_empty() {
        if rule.required {
            return Some(ValidationError::new(
                field.key(),
                format!("{} is required", field.label()),
            ));
        }
        return None;
    }

    // Bounds are in characters, not bytes; Ethiopic names are multi-byte.
    let length = trimmed.chars().count();
    if length < rule.min_len || length > rule.max_len {
        return Some(ValidationError::new(
            field.key(),
            format!(
                "{} must be between {} and {} characters",
                field.label(),
                rule.min_len,
                rule.max_len
            ),
        ));
    }

    if !rule.class.matches(trimmed) {
        return Some(ValidationError::new(
            field.key(),
            rule.class.violation_message(field),
        ));
    }

    None
}

/// Real-time entry point, intended to run on every field edit.
pub fn validate_field(field: FieldId, value: &str) -> Option<ValidationError> {
    validate_field_in(Scope::RealTime, field, value)
}

/// Same rule, but presence is contextual (family-member passports are
/// optional): empty input passes, non-empty input must satisfy the rule.
pub fn validate_field_if_present(
    scope: Scope,
    field: FieldId,
    value: &str,
) -> Option<ValidationError> {
    if value.trim().is_empty() {
        return None;
    }
    validate_field_in(scope, field, value)
}

/// Inclusive age window in whole years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeBounds {
    pub min: i32,
    pub max: i32,
}

pub const APPLICANT_AGE: AgeBounds = AgeBounds { min: 18, max: 100 };
pub const SPOUSE_AGE: AgeBounds = AgeBounds { min: 16, max: 100 };
pub const CHILD_AGE: AgeBounds = AgeBounds { min: 0, max: 20 };

/// Date-of-birth rule: present, not in the future, age inside `bounds`.
/// `field_key` carries the member-scoped key when validating a dependent.
pub fn validate_date_of_birth(
    date_of_birth: Option<NaiveDate>,
    today: NaiveDate,
    bounds: AgeBounds,
    field_key: &str,
) -> Option<ValidationError> {
    let Some(date_of_birth) = date_of_birth else {
        return Some(ValidationError::new(
            field_key,
            "Date of birth is required",
        ));
    };

    if date_of_birth > today {
        return Some(ValidationError::new(
            field_key,
            "Date of birth cannot be in the future",
        ));
    }

    let age = age_in_years(date_of_birth, today);
    if age < bounds.min || age > bounds.max {
        return Some(ValidationError::new(
            field_key,
            format!(
                "Age must be between {} and {} (currently {})",
                bounds.min, bounds.max, age
            ),
        ));
    }

    None
}

/// Soft-warning horizon for passports expiring soon.
pub const EXPIRY_WARNING_MONTHS: u32 = 6;
/// Anything further out than this is treated as a data-entry error.
pub const EXPIRY_MAX_YEARS: i32 = 10;

/// Passport-expiry rule: a future, unexpired date no more than ten years
/// out. An expiry within six months passes with a warning.
pub fn validate_passport_expiry(
    expiry: Option<NaiveDate>,
    today: NaiveDate,
    required: bool,
    field_key: &str,
) -> (Option<ValidationError>, Option<ValidationWarning>) {
    let Some(expiry) = expiry else {
        if required {
            return (
                Some(ValidationError::new(
                    field_key,
                    "Passport expiry date is required",
                )),
                None,
            );
        }
        return (None, None);
    };

    if expiry <= today {
        return (
            Some(ValidationError::new(field_key, "Passport has expired")),
            None,
        );
    }

    let plausible_horizon = today
        .checked_add_months(chrono::Months::new(EXPIRY_MAX_YEARS as u32 * 12))
        .unwrap_or(chrono::NaiveDate::MAX);
    if expiry > plausible_horizon {
        return (
            Some(ValidationError::new(
                field_key,
                format!(
                    "Passport expiry more than {EXPIRY_MAX_YEARS} years out looks like a data-entry error"
                ),
            )),
            None,
        );
    }

    let warning_horizon = today
        .checked_add_months(chrono::Months::new(EXPIRY_WARNING_MONTHS))
        .unwrap_or(expiry);
    let warning = (expiry <= warning_horizon).then(|| {
        ValidationWarning::new(
            field_key,
            format!("Passport expires within {EXPIRY_WARNING_MONTHS} months; consider renewing before travel"),
        )
    });

    (None, warning)
}
