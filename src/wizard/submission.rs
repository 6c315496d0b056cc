use serde::{Deserialize, Serialize};

use super::domain::{BackgroundInfo, ContactInfo, FormId, PersonalInfo};
use super::photo::PhotoRef;
use super::roster::FamilyMember;

/// Applicant-side sections bundled for submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantData {
    pub personal_info: PersonalInfo,
    pub contact_info: ContactInfo,
    pub background_info: BackgroundInfo,
}

/// Payload handed to the external submission collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub form_id: FormId,
    pub applicant_data: ApplicantData,
    pub family_members: Vec<FamilyMember>,
    pub primary_photo: PhotoRef,
}

/// Confirmation returned by the collaborator on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub form_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("submission service unavailable: {0}")]
    Transport(String),
    #[error("submission rejected: {0}")]
    Rejected(String),
}

/// External collaborator that accepts completed entries.
pub trait SubmissionGateway {
    fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, SubmissionError>;
}
