//! The entry wizard: form data model, dependent roster, validators, draft
//! persistence, photo handoff, and the controller that orchestrates them.

pub mod controller;
pub mod domain;
pub mod draft;
pub mod photo;
pub mod roster;
pub mod submission;
pub mod validation;

#[cfg(test)]
mod tests;

pub use controller::{DateInput, WizardController, WizardError};
pub use domain::{
    ApplicationForm, BackgroundInfo, ContactInfo, EducationLevel, FormId, Gender, MaritalStatus,
    PersonalInfo, WizardStep,
};
pub use draft::{DraftError, DraftScheduler, DraftStore, FileKvStore, KeyValueStore, MemoryKvStore};
pub use photo::{
    complete_capture, CaptureRequest, CompletedHandoff, HandoffError, HandoffKey, HandoffMailbox,
    PersonRef, PhotoAttachment, PhotoRef, PhotoUploader, UploadError, UploadRequest,
};
pub use roster::{FamilyMember, FamilyRoster, MemberId, Relationship, RosterError, MAX_CHILDREN};
pub use submission::{
    ApplicantData, SubmissionError, SubmissionGateway, SubmissionPayload, SubmissionReceipt,
};
pub use validation::fields::{validate_field, FieldId};
pub use validation::reference::{ReferenceData, ReferenceError};
pub use validation::steps::{validate_complete_form, validate_step, MAX_FAMILY_MEMBERS};
pub use validation::{StepReport, ValidationError, ValidationWarning};
