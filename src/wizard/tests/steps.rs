use super::common::{date, today};
use crate::wizard::domain::{
    ApplicationForm, EducationLevel, Gender, MaritalStatus, WizardStep,
};
use crate::wizard::photo::{PhotoAttachment, PhotoRef};
use crate::wizard::roster::MemberId;
use crate::wizard::validation::reference::ReferenceData;
use crate::wizard::validation::steps::{
    validate_business_rules, validate_complete_form, validate_contact_info, validate_family_info,
    validate_personal_info, validate_photo, validate_step, MAX_FAMILY_MEMBERS,
};

fn committed_photo() -> PhotoAttachment {
    PhotoAttachment::Uploaded(PhotoRef {
        name: "photo.jpg".to_string(),
        url: "https://photos.example/entry/applicant".to_string(),
        size: 2048,
    })
}

fn valid_form() -> ApplicationForm {
    let mut form = ApplicationForm::new();

    form.personal_info.first_name = "Abebe".to_string();
    form.personal_info.last_name = "Kebede".to_string();
    form.personal_info.gender = Some(Gender::Male);
    form.personal_info.date_of_birth = Some(date(1990, 5, 15));
    form.personal_info.place_of_birth = "Addis Ababa".to_string();
    form.personal_info.country_of_birth = "Ethiopia".to_string();

    form.contact_info.address = "Bole Road 12, Addis Ababa".to_string();
    form.contact_info.phone = "0911223344".to_string();
    form.contact_info.email = "abebe.kebede@example.com".to_string();
    form.contact_info.passport_number = "EP1234567".to_string();
    form.contact_info.passport_expiry = Some(date(2030, 1, 1));

    form.background_info.education_level = Some(EducationLevel::UniversityDegree);
    form.background_info.marital_status = Some(MaritalStatus::Single);
    form.background_info.occupation = "Engineer".to_string();

    form.applicant_photo = Some(committed_photo());
    form
}

fn add_valid_spouse(form: &mut ApplicationForm) -> MemberId {
    form.background_info.marital_status = Some(MaritalStatus::Married);
    let spouse = form.family.add_spouse().expect("spouse slot empty");
    spouse.first_name = "Sara".to_string();
    spouse.last_name = "Kebede".to_string();
    spouse.gender = Some(Gender::Female);
    spouse.date_of_birth = Some(date(1992, 3, 10));
    spouse.place_of_birth = "Bahir Dar".to_string();
    spouse.country_of_birth = "Ethiopia".to_string();
    spouse.id
}

fn add_valid_child(form: &mut ApplicationForm, first_name: &str, born: chrono::NaiveDate) -> MemberId {
    let child = form.family.add_child();
    child.first_name = first_name.to_string();
    child.last_name = "Kebede".to_string();
    child.gender = Some(Gender::Male);
    child.date_of_birth = Some(born);
    child.place_of_birth = "Addis Ababa".to_string();
    child.country_of_birth = "Ethiopia".to_string();
    child.id
}

#[test]
fn valid_form_passes_every_step() {
    let form = valid_form();
    let reference = ReferenceData::default();
    for step in WizardStep::ordered() {
        let report = validate_step(step, &form, today(), &reference);
        assert!(report.is_valid(), "{step:?} failed: {:?}", report.errors);
    }
}

#[test]
fn applicant_under_eighteen_fails_personal_info() {
    let mut form = valid_form();
    form.personal_info.date_of_birth = Some(date(2008, 1, 1));

    let report = validate_personal_info(&form, today());
    assert!(!report.is_valid());
    assert!(report.errors.iter().any(|e| e.field == "date_of_birth"));
}

#[test]
fn personal_info_accumulates_simultaneous_errors() {
    let form = ApplicationForm::new();
    let report = validate_personal_info(&form, today());
    // Name, gender, place, country, and date of birth are all missing.
    assert!(report.errors.len() >= 5);
}

#[test]
fn expiring_passport_warns_without_blocking() {
    let mut form = valid_form();
    form.contact_info.passport_expiry = Some(date(2025, 8, 1));

    let report = validate_contact_info(&form, today());
    assert!(report.is_valid());
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].field, "passport_expiry");
}

#[test]
fn married_without_spouse_fails_family_info() {
    let mut form = valid_form();
    form.background_info.marital_status = Some(MaritalStatus::Married);

    let report = validate_family_info(&form, today());
    assert!(!report.is_valid());
    assert!(report.errors.iter().any(|e| e.field == "family_members"));

    add_valid_spouse(&mut form);
    let report = validate_family_info(&form, today());
    assert!(report.is_valid(), "{:?}", report.errors);
}

#[test]
fn single_with_spouse_fails_family_info() {
    let mut form = valid_form();
    add_valid_spouse(&mut form);
    form.background_info.marital_status = Some(MaritalStatus::Single);

    let report = validate_family_info(&form, today());
    assert!(!report.is_valid());
}

#[test]
fn child_age_boundary_is_twenty() {
    let mut form = valid_form();
    // Exactly 20 years old: passes.
    let ok_id = add_valid_child(&mut form, "Hana", date(2005, 6, 1));
    let report = validate_family_info(&form, today());
    assert!(report.is_valid(), "{:?}", report.errors);

    // Exactly 21: fails, naming that child's field.
    form.family.remove_member(ok_id).expect("removed");
    let bad_id = add_valid_child(&mut form, "Hana", date(2004, 6, 1));
    let report = validate_family_info(&form, today());
    let expected_field = format!("family_members.{}.date_of_birth", bad_id.0);
    assert!(report.errors.iter().any(|e| e.field == expected_field));
}

#[test]
fn young_spouse_fails_family_info() {
    let mut form = valid_form();
    let spouse_id = add_valid_spouse(&mut form);
    if let Some(spouse) = form.family.member_mut(spouse_id) {
        spouse.date_of_birth = Some(date(2010, 1, 1));
    }

    let report = validate_family_info(&form, today());
    let expected_field = format!("family_members.{}.date_of_birth", spouse_id.0);
    assert!(report.errors.iter().any(|e| e.field == expected_field));
}

#[test]
fn low_education_requires_an_occupation() {
    let mut form = valid_form();
    form.background_info.education_level = Some(EducationLevel::PrimaryOnly);
    form.background_info.occupation = String::new();

    let report = validate_business_rules(&form, today(), &ReferenceData::default());
    assert!(report.errors.iter().any(|e| e.field == "occupation"));

    form.background_info.occupation = "Carpenter".to_string();
    let report = validate_business_rules(&form, today(), &ReferenceData::default());
    assert!(report.is_valid(), "{:?}", report.errors);
}

#[test]
fn ineligible_country_is_rejected_at_review() {
    let mut form = valid_form();
    form.personal_info.country_of_birth = "Atlantis".to_string();

    let report = validate_business_rules(&form, today(), &ReferenceData::default());
    assert!(report.errors.iter().any(|e| e.field == "country_of_birth"));
}

#[test]
fn duplicate_full_names_are_rejected() {
    let mut form = valid_form();
    let child_id = add_valid_child(&mut form, "Abebe", date(2010, 1, 1));

    let report = validate_business_rules(&form, today(), &ReferenceData::default());
    let expected_field = format!("family_members.{}.first_name", child_id.0);
    assert!(report.errors.iter().any(|e| e.field == expected_field));
}

#[test]
fn family_size_is_capped() {
    let mut form = valid_form();
    add_valid_spouse(&mut form);
    for i in 0..10 {
        add_valid_child(&mut form, &format!("Child{i}"), date(2015, 1, 1));
    }
    assert!(form.family.member_count() > MAX_FAMILY_MEMBERS);

    let report = validate_business_rules(&form, today(), &ReferenceData::default());
    assert!(report.errors.iter().any(|e| e.field == "family_members"));
}

#[test]
fn photo_gate_requires_a_committed_upload() {
    let mut form = valid_form();

    form.applicant_photo = None;
    assert!(!validate_photo(&form).is_valid());

    // A selected-but-unuploaded file does not count.
    form.applicant_photo = Some(PhotoAttachment::Pending(vec![1, 2, 3]));
    assert!(!validate_photo(&form).is_valid());

    // Neither does an upload that came back without a URL or with no bytes.
    form.applicant_photo = Some(PhotoAttachment::Uploaded(PhotoRef {
        name: "photo.jpg".to_string(),
        url: String::new(),
        size: 2048,
    }));
    assert!(!validate_photo(&form).is_valid());
    form.applicant_photo = Some(PhotoAttachment::Uploaded(PhotoRef {
        name: "photo.jpg".to_string(),
        url: "https://photos.example/p".to_string(),
        size: 0,
    }));
    assert!(!validate_photo(&form).is_valid());

    form.applicant_photo = Some(committed_photo());
    assert!(validate_photo(&form).is_valid());
}

#[test]
fn complete_form_unions_all_validators_without_duplicates() {
    let mut form = valid_form();
    form.background_info.marital_status = Some(MaritalStatus::Married);

    let report = validate_complete_form(&form, today(), &ReferenceData::default());
    // The spouse-consistency rule runs in both the family and business
    // validators; the union must surface it once.
    let spouse_errors = report
        .errors
        .iter()
        .filter(|e| e.field == "family_members")
        .count();
    assert_eq!(spouse_errors, 1);
}

#[test]
fn complete_form_passes_for_a_fully_valid_entry() {
    let mut form = valid_form();
    add_valid_spouse(&mut form);
    add_valid_child(&mut form, "Hana", date(2012, 4, 4));

    let report = validate_complete_form(&form, today(), &ReferenceData::default());
    assert!(report.is_valid(), "{:?}", report.errors);
}
