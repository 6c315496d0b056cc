//! Step and business-rule validators.
//!
//! One validator per wizard screen plus the cross-cutting business rules run
//! again at final review, and the complete-form union used as the submission
//! gate. Errors accumulate; nothing short-circuits.

use chrono::NaiveDate;

use super::fields::{
    member_field_key, validate_date_of_birth, validate_field_if_present, validate_field_in,
    validate_passport_expiry, AgeBounds, FieldId, Scope, APPLICANT_AGE, CHILD_AGE, SPOUSE_AGE,
};
use super::reference::ReferenceData;
use super::{StepReport, ValidationError};
use crate::wizard::domain::{ApplicationForm, MaritalStatus, WizardStep};
use crate::wizard::roster::{FamilyMember, Relationship};

/// Hard cap on dependents per entry (spouse plus children).
pub const MAX_FAMILY_MEMBERS: usize = 10;

/// Validate the named step against the current form snapshot.
pub fn validate_step(
    step: WizardStep,
    form: &ApplicationForm,
    today: NaiveDate,
    reference: &ReferenceData,
) -> StepReport {
    match step {
        WizardStep::PersonalInfo => validate_personal_info(form, today),
        WizardStep::ContactInfo => validate_contact_info(form, today),
        WizardStep::BackgroundInfo => validate_background_info(form),
        WizardStep::FamilyInfo => validate_family_info(form, today),
        WizardStep::Photo => validate_photo(form),
        WizardStep::Review => validate_complete_form(form, today, reference),
    }
}

pub fn validate_personal_info(form: &ApplicationForm, today: NaiveDate) -> StepReport {
    let mut report = StepReport::default();
    let personal = &form.personal_info;

    report.extend_error(validate_field_in(
        Scope::Step,
        FieldId::FirstName,
        &personal.first_name,
    ));
    report.extend_error(validate_field_in(
        Scope::Step,
        FieldId::MiddleName,
        &personal.middle_name,
    ));
    report.extend_error(validate_field_in(
        Scope::Step,
        FieldId::LastName,
        &personal.last_name,
    ));
    report.extend_error(validate_field_in(
        Scope::Step,
        FieldId::PlaceOfBirth,
        &personal.place_of_birth,
    ));
    report.extend_error(validate_field_in(
        Scope::Step,
        FieldId::CountryOfBirth,
        &personal.country_of_birth,
    ));

    if personal.gender.is_none() {
        report.push_error(ValidationError::new("gender", "Gender is required"));
    }

    report.extend_error(validate_date_of_birth(
        personal.date_of_birth,
        today,
        APPLICANT_AGE,
        FieldId::DateOfBirth.key(),
    ));

    report
}

pub fn validate_contact_info(form: &ApplicationForm, today: NaiveDate) -> StepReport {
    let mut report = StepReport::default();
    let contact = &form.contact_info;

    report.extend_error(validate_field_in(
        Scope::Step,
        FieldId::Address,
        &contact.address,
    ));
    report.extend_error(validate_field_in(
        Scope::Step,
        FieldId::Phone,
        &contact.phone,
    ));
    report.extend_error(validate_field_in(
        Scope::Step,
        FieldId::Email,
        &contact.email,
    ));
    report.extend_error(validate_field_in(
        Scope::Step,
        FieldId::PassportNumber,
        &contact.passport_number,
    ));

    let (error, warning) = validate_passport_expiry(
        contact.passport_expiry,
        today,
        true,
        FieldId::PassportExpiry.key(),
    );
    report.extend_error(error);
    if let Some(warning) = warning {
        report.push_warning(warning);
    }

    report
}

pub fn validate_background_info(form: &ApplicationForm) -> StepReport {
    let mut report = StepReport::default();
    let background = &form.background_info;

    if background.education_level.is_none() {
        report.push_error(ValidationError::new(
            "education_level",
            "Education level is required",
        ));
    }
    if background.marital_status.is_none() {
        report.push_error(ValidationError::new(
            "marital_status",
            "Marital status is required",
        ));
    }
    report.extend_error(validate_field_if_present(
        Scope::Step,
        FieldId::Occupation,
        &background.occupation,
    ));

    report
}

pub fn validate_family_info(form: &ApplicationForm, today: NaiveDate) -> StepReport {
    let mut report = StepReport::default();

    spouse_consistency(form, &mut report);

    for member in form.family.members() {
        validate_member(member, today, &mut report);
    }

    report
}

/// The photo-step gate: advancement requires a committed applicant photo,
/// not merely a selected file.
pub fn validate_photo(form: &ApplicationForm) -> StepReport {
    let mut report = StepReport::default();
    let committed = form
        .applicant_photo
        .as_ref()
        .is_some_and(|photo| photo.is_committed());
    if !committed {
        report.push_error(ValidationError::new(
            "photo",
            "A cropped and uploaded photograph is required",
        ));
    }
    report
}

/// Cross-cutting eligibility rules, evaluated again at final review.
pub fn validate_business_rules(
    form: &ApplicationForm,
    _today: NaiveDate,
    reference: &ReferenceData,
) -> StepReport {
    let mut report = StepReport::default();

    // Low education tiers qualify through work experience, captured as an
    // occupation.
    if let Some(level) = form.background_info.education_level {
        if level.requires_work_experience() && form.background_info.occupation.trim().is_empty() {
            report.push_error(ValidationError::new(
                FieldId::Occupation.key(),
                format!(
                    "An occupation is required with education level '{}'",
                    level.label()
                ),
            ));
        }
    }

    if form.family.member_count() > MAX_FAMILY_MEMBERS {
        report.push_error(ValidationError::new(
            "family_members",
            format!("At most {MAX_FAMILY_MEMBERS} family members are allowed"),
        ));
    }

    let country = form.personal_info.country_of_birth.trim();
    if !country.is_empty() && !reference.is_eligible_country(country) {
        report.push_error(ValidationError::new(
            FieldId::CountryOfBirth.key(),
            format!("{country} is not on the eligibility list for this lottery year"),
        ));
    }

    duplicate_names(form, &mut report);
    spouse_consistency(form, &mut report);

    report
}

/// Union of every validator; the single gate for final submission.
pub fn validate_complete_form(
    form: &ApplicationForm,
    today: NaiveDate,
    reference: &ReferenceData,
) -> StepReport {
    let mut report = validate_personal_info(form, today);
    report.merge(validate_contact_info(form, today));
    report.merge(validate_background_info(form));
    report.merge(validate_family_info(form, today));
    report.merge(validate_photo(form));
    report.merge(validate_business_rules(form, today, reference));
    report
}

fn spouse_consistency(form: &ApplicationForm, report: &mut StepReport) {
    let spouse = form.family.spouse();
    match form.background_info.marital_status {
        Some(MaritalStatus::Married) if spouse.is_none() => {
            report.push_error(ValidationError::new(
                "family_members",
                "Married applicants must list exactly one spouse",
            ));
        }
        Some(MaritalStatus::Single) if spouse.is_some() => {
            report.push_error(ValidationError::new(
                "family_members",
                "Single applicants cannot list a spouse",
            ));
        }
        _ => {}
    }
}

fn duplicate_names(form: &ApplicationForm, report: &mut StepReport) {
    let mut seen: Vec<String> = Vec::new();

    let applicant = form.applicant_full_name();
    if !applicant.is_empty() {
        seen.push(applicant.to_lowercase());
    }

    for member in form.family.members() {
        let name = member.full_name();
        if name.is_empty() {
            continue;
        }
        let normalized = name.to_lowercase();
        if seen.contains(&normalized) {
            report.push_error(ValidationError::new(
                member_field_key(member.id, FieldId::FirstName),
                format!("{name} appears more than once on this application"),
            ));
        } else {
            seen.push(normalized);
        }
    }
}

fn age_bounds_for(relationship: Relationship) -> AgeBounds {
    match relationship {
        Relationship::Spouse => SPOUSE_AGE,
        Relationship::Child => CHILD_AGE,
    }
}

/// A dependent is held to the same field rules as the applicant, plus the
/// role-specific age window. Passport fields are optional for dependents.
fn validate_member(member: &FamilyMember, today: NaiveDate, report: &mut StepReport) {
    let field = |id: FieldId| member_field_key(member.id, id);

    for (id, value) in [
        (FieldId::FirstName, &member.first_name),
        (FieldId::LastName, &member.last_name),
        (FieldId::PlaceOfBirth, &member.place_of_birth),
        (FieldId::CountryOfBirth, &member.country_of_birth),
    ] {
        if let Some(error) = validate_field_in(Scope::Step, id, value) {
            report.push_error(ValidationError::new(field(id), error.message));
        }
    }
    if let Some(error) = validate_field_in(Scope::Step, FieldId::MiddleName, &member.middle_name) {
        report.push_error(ValidationError::new(
            field(FieldId::MiddleName),
            error.message,
        ));
    }

    if member.gender.is_none() {
        report.push_error(ValidationError::new(
            format!("family_members.{}.gender", member.id.0),
            format!("Gender is required for each {}", member.relationship.label()),
        ));
    }

    report.extend_error(validate_date_of_birth(
        member.date_of_birth,
        today,
        age_bounds_for(member.relationship),
        &field(FieldId::DateOfBirth),
    ));

    if let Some(error) =
        validate_field_if_present(Scope::Step, FieldId::PassportNumber, &member.passport_number)
    {
        report.push_error(ValidationError::new(
            field(FieldId::PassportNumber),
            error.message,
        ));
    }
    let (error, warning) = validate_passport_expiry(
        member.passport_expiry,
        today,
        false,
        &field(FieldId::PassportExpiry),
    );
    report.extend_error(error);
    if let Some(warning) = warning {
        report.push_warning(warning);
    }
}
