use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::photo::PhotoAttachment;
use super::roster::FamilyRoster;

/// Client-generated identifier for one lottery entry session.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FormId(pub String);

static ENTRY_SEQUENCE: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_form_id() -> FormId {
    let id = ENTRY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    FormId(format!("entry-{id:06}"))
}

/// The six screens of the entry wizard, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    PersonalInfo,
    ContactInfo,
    BackgroundInfo,
    FamilyInfo,
    Photo,
    Review,
}

impl WizardStep {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::PersonalInfo,
            Self::ContactInfo,
            Self::BackgroundInfo,
            Self::FamilyInfo,
            Self::Photo,
            Self::Review,
        ]
    }

    /// 1-based position, matching the persisted `dv_form_step` value.
    pub const fn index(self) -> u8 {
        match self {
            Self::PersonalInfo => 1,
            Self::ContactInfo => 2,
            Self::BackgroundInfo => 3,
            Self::FamilyInfo => 4,
            Self::Photo => 5,
            Self::Review => 6,
        }
    }

    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(Self::PersonalInfo),
            2 => Some(Self::ContactInfo),
            3 => Some(Self::BackgroundInfo),
            4 => Some(Self::FamilyInfo),
            5 => Some(Self::Photo),
            6 => Some(Self::Review),
            _ => None,
        }
    }

    pub const fn next(self) -> Self {
        match self {
            Self::PersonalInfo => Self::ContactInfo,
            Self::ContactInfo => Self::BackgroundInfo,
            Self::BackgroundInfo => Self::FamilyInfo,
            Self::FamilyInfo => Self::Photo,
            Self::Photo => Self::Review,
            Self::Review => Self::Review,
        }
    }

    pub const fn previous(self) -> Self {
        match self {
            Self::PersonalInfo => Self::PersonalInfo,
            Self::ContactInfo => Self::PersonalInfo,
            Self::BackgroundInfo => Self::ContactInfo,
            Self::FamilyInfo => Self::BackgroundInfo,
            Self::Photo => Self::FamilyInfo,
            Self::Review => Self::Photo,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::PersonalInfo => "Personal Information",
            Self::ContactInfo => "Contact Information",
            Self::BackgroundInfo => "Background Information",
            Self::FamilyInfo => "Family Information",
            Self::Photo => "Photograph",
            Self::Review => "Review & Submit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaritalStatus {
    Single,
    Married,
}

impl MaritalStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::Married => "Married",
        }
    }
}

/// The DV form's education ladder, lowest rung first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    PrimaryOnly,
    HighSchoolNoDegree,
    HighSchoolDegree,
    VocationalSchool,
    SomeUniversity,
    UniversityDegree,
    SomeGraduate,
    MastersDegree,
    SomeDoctorate,
    Doctorate,
}

impl EducationLevel {
    pub const fn ordered() -> [Self; 10] {
        [
            Self::PrimaryOnly,
            Self::HighSchoolNoDegree,
            Self::HighSchoolDegree,
            Self::VocationalSchool,
            Self::SomeUniversity,
            Self::UniversityDegree,
            Self::SomeGraduate,
            Self::MastersDegree,
            Self::SomeDoctorate,
            Self::Doctorate,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::PrimaryOnly => "Primary school only",
            Self::HighSchoolNoDegree => "High school, no degree",
            Self::HighSchoolDegree => "High school degree",
            Self::VocationalSchool => "Vocational school",
            Self::SomeUniversity => "Some university courses",
            Self::UniversityDegree => "University degree",
            Self::SomeGraduate => "Some graduate-level courses",
            Self::MastersDegree => "Master's degree",
            Self::SomeDoctorate => "Some doctorate-level courses",
            Self::Doctorate => "Doctorate",
        }
    }

    /// Rungs below a high school degree must document qualifying work
    /// experience instead, which the form captures as an occupation.
    pub const fn requires_work_experience(self) -> bool {
        matches!(self, Self::PrimaryOnly | Self::HighSchoolNoDegree)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    pub place_of_birth: String,
    pub country_of_birth: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub address: String,
    pub phone: String,
    pub email: String,
    pub passport_number: String,
    pub passport_expiry: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackgroundInfo {
    pub education_level: Option<EducationLevel>,
    pub marital_status: Option<MaritalStatus>,
    pub occupation: String,
}

/// Root aggregate for one wizard session. Mutated only through the
/// controller's update operations; persisted as the draft on every change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationForm {
    pub form_id: FormId,
    pub personal_info: PersonalInfo,
    pub contact_info: ContactInfo,
    pub background_info: BackgroundInfo,
    pub family: FamilyRoster,
    pub applicant_photo: Option<PhotoAttachment>,
    pub current_step: WizardStep,
    pub is_complete: bool,
}

impl ApplicationForm {
    pub fn new() -> Self {
        Self {
            form_id: next_form_id(),
            personal_info: PersonalInfo::default(),
            contact_info: ContactInfo::default(),
            background_info: BackgroundInfo::default(),
            family: FamilyRoster::default(),
            applicant_photo: None,
            current_step: WizardStep::PersonalInfo,
            is_complete: false,
        }
    }

    pub fn applicant_full_name(&self) -> String {
        let mut parts = Vec::new();
        for part in [
            &self.personal_info.first_name,
            &self.personal_info.middle_name,
            &self.personal_info.last_name,
        ] {
            let trimmed = part.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed);
            }
        }
        parts.join(" ")
    }
}

impl Default for ApplicationForm {
    fn default() -> Self {
        Self::new()
    }
}
