//! The wizard controller: owns the form snapshot for one session, routes all
//! edits, gates navigation on validation, and delegates persistence and
//! submission.

use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::domain::{
    ApplicationForm, BackgroundInfo, ContactInfo, FormId, PersonalInfo, WizardStep,
};
use super::draft::{DraftError, DraftScheduler, DraftStore, KeyValueStore};
use super::photo::{
    CaptureRequest, HandoffKey, HandoffMailbox, PersonRef, PhotoAttachment, PhotoRef,
    PhotoUploader, UploadError,
};
use super::roster::{FamilyMember, MemberId, RosterError};
use super::submission::{
    ApplicantData, SubmissionError, SubmissionGateway, SubmissionPayload, SubmissionReceipt,
};
use super::validation::fields::FieldId;
use super::validation::reference::ReferenceData;
use super::validation::steps::{validate_complete_form, validate_step};
use super::validation::{StepReport, ValidationError};
use crate::calendar::{ethiopian_to_gregorian, is_valid_ethiopian_date, EthiopianDate};

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("step validation failed with {} error(s)", errors.len())]
    StepRejected { errors: Vec<ValidationError> },
    #[error("submission is only available from the review step")]
    NotAtReview,
    #[error("a submission is already in flight")]
    SubmissionInFlight,
    #[error("this entry has already been submitted")]
    AlreadySubmitted,
    #[error("submission failed: {0}")]
    SubmissionFailed(String),
    #[error("{}", .0.message)]
    InvalidDate(ValidationError),
    #[error("no such person on this entry: {0:?}")]
    UnknownPerson(PersonRef),
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error(transparent)]
    Draft(#[from] DraftError),
    #[error(transparent)]
    Upload(#[from] UploadError),
}

/// A date as the user entered it, in either supported calendar. Invalid
/// Ethiopian input resolves to a structured validation error, never to a
/// silently substituted date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateInput {
    Gregorian(NaiveDate),
    Ethiopian(EthiopianDate),
}

impl DateInput {
    fn resolve(self, field_key: &str) -> Result<NaiveDate, ValidationError> {
        match self {
            DateInput::Gregorian(date) => Ok(date),
            DateInput::Ethiopian(date) => {
                if !is_valid_ethiopian_date(date) {
                    return Err(ValidationError::new(
                        field_key,
                        format!(
                            "{}-{}-{} is not a valid Ethiopian date",
                            date.year, date.month, date.day
                        ),
                    ));
                }
                ethiopian_to_gregorian(date)
                    .map_err(|err| ValidationError::new(field_key, err.to_string()))
            }
        }
    }
}

pub struct WizardController<K: KeyValueStore> {
    form: ApplicationForm,
    draft: DraftStore<K>,
    scheduler: DraftScheduler,
    reference: ReferenceData,
    last_report: StepReport,
    top_level_error: Option<String>,
    submission_in_flight: bool,
}

impl<K: KeyValueStore> WizardController<K> {
    /// Start a wizard session: resume the persisted draft if one exists,
    /// otherwise begin a fresh form.
    pub fn resume(
        store: K,
        reference: ReferenceData,
        debounce: Duration,
    ) -> Result<Self, DraftError> {
        let draft = DraftStore::new(store);
        let form = match draft.load() {
            Ok(Some(form)) => {
                info!(form_id = %form.form_id.0, step = form.current_step.index(), "resumed draft");
                form
            }
            Ok(None) => ApplicationForm::new(),
            Err(err) => {
                // A corrupt draft should not strand the user; start over.
                warn!(error = %err, "discarding unreadable draft");
                ApplicationForm::new()
            }
        };

        Ok(Self {
            form,
            draft,
            scheduler: DraftScheduler::new(debounce),
            reference,
            last_report: StepReport::default(),
            top_level_error: None,
            submission_in_flight: false,
        })
    }

    pub fn form(&self) -> &ApplicationForm {
        &self.form
    }

    pub fn form_id(&self) -> &FormId {
        &self.form.form_id
    }

    pub fn current_step(&self) -> WizardStep {
        self.form.current_step
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.last_report.errors
    }

    pub fn last_report(&self) -> &StepReport {
        &self.last_report
    }

    pub fn top_level_error(&self) -> Option<&str> {
        self.top_level_error.as_deref()
    }

    pub fn submission_in_flight(&self) -> bool {
        self.submission_in_flight
    }

    /// Read-only view of the persistent draft store (the controller is its
    /// only writer).
    pub fn draft_store(&self) -> &DraftStore<K> {
        &self.draft
    }

    fn touch(&mut self) {
        self.scheduler.mark_dirty(self.form.clone(), Instant::now());
    }

    /// Flush the debounced draft write if its delay has elapsed. The caller's
    /// event loop drives this; navigation never waits on it.
    pub fn tick(&mut self, now: Instant) -> Result<bool, DraftError> {
        self.scheduler.flush_due(now, &mut self.draft)
    }

    // -- field edits ------------------------------------------------------

    pub fn update_personal_info(&mut self, edit: impl FnOnce(&mut PersonalInfo)) {
        edit(&mut self.form.personal_info);
        self.touch();
    }

    pub fn update_contact_info(&mut self, edit: impl FnOnce(&mut ContactInfo)) {
        edit(&mut self.form.contact_info);
        self.touch();
    }

    pub fn update_background_info(&mut self, edit: impl FnOnce(&mut BackgroundInfo)) {
        edit(&mut self.form.background_info);
        self.touch();
    }

    pub fn update_member(
        &mut self,
        id: MemberId,
        edit: impl FnOnce(&mut FamilyMember),
    ) -> Result<(), WizardError> {
        let member = self
            .form
            .family
            .member_mut(id)
            .ok_or(RosterError::MemberNotFound(id))?;
        edit(member);
        self.touch();
        Ok(())
    }

    pub fn set_applicant_date_of_birth(&mut self, input: DateInput) -> Result<(), WizardError> {
        let date = input
            .resolve(FieldId::DateOfBirth.key())
            .map_err(WizardError::InvalidDate)?;
        self.form.personal_info.date_of_birth = Some(date);
        self.touch();
        Ok(())
    }

    pub fn set_passport_expiry(&mut self, input: DateInput) -> Result<(), WizardError> {
        let date = input
            .resolve(FieldId::PassportExpiry.key())
            .map_err(WizardError::InvalidDate)?;
        self.form.contact_info.passport_expiry = Some(date);
        self.touch();
        Ok(())
    }

    pub fn set_member_date_of_birth(
        &mut self,
        id: MemberId,
        input: DateInput,
    ) -> Result<(), WizardError> {
        let date = input
            .resolve(FieldId::DateOfBirth.key())
            .map_err(WizardError::InvalidDate)?;
        self.update_member(id, |member| member.date_of_birth = Some(date))
    }

    // -- dependents -------------------------------------------------------

    pub fn add_spouse(&mut self) -> Result<MemberId, WizardError> {
        let id = self.form.family.add_spouse()?.id;
        self.touch();
        Ok(id)
    }

    pub fn add_child(&mut self) -> MemberId {
        let id = self.form.family.add_child().id;
        self.touch();
        id
    }

    pub fn remove_member(&mut self, id: MemberId) -> Result<(), WizardError> {
        self.form.family.remove_member(id)?;
        self.touch();
        Ok(())
    }

    pub fn set_child_count(&mut self, count: usize) {
        self.form.family.set_child_count(count);
        self.touch();
    }

    // -- navigation -------------------------------------------------------

    /// Re-validate the current step; advance only if it passes. The error set
    /// from the last validation pass is fully replaced either way.
    pub fn advance(&mut self, today: NaiveDate) -> Result<WizardStep, WizardError> {
        let report = validate_step(self.form.current_step, &self.form, today, &self.reference);
        if !report.is_valid() {
            debug!(
                step = self.form.current_step.index(),
                errors = report.errors.len(),
                "step rejected"
            );
            let errors = report.errors.clone();
            self.last_report = report;
            return Err(WizardError::StepRejected { errors });
        }

        self.last_report = report;
        let from = self.form.current_step;
        self.form.current_step = from.next();
        if self.form.current_step != from {
            info!(
                from = from.index(),
                to = self.form.current_step.index(),
                "advanced"
            );
            self.touch();
        }
        Ok(self.form.current_step)
    }

    /// Step back without validation; floored at the first step.
    pub fn retreat(&mut self) -> WizardStep {
        let from = self.form.current_step;
        self.form.current_step = from.previous();
        if self.form.current_step != from {
            self.touch();
        }
        self.form.current_step
    }

    // -- photo handoff ----------------------------------------------------

    fn person_key(&self, person: PersonRef) -> Result<HandoffKey, WizardError> {
        let known = match person {
            PersonRef::Applicant => true,
            PersonRef::Spouse => self.form.family.spouse().is_some(),
            PersonRef::Child(id) => self.form.family.member(id).is_some(),
        };
        if !known {
            return Err(WizardError::UnknownPerson(person));
        }
        Ok(HandoffKey {
            form_id: self.form.form_id.clone(),
            person,
        })
    }

    /// Phase 1 of the handoff: post the raw capture for the crop view. A
    /// repeat capture for the same person overwrites the pending one.
    pub fn request_photo_capture(
        &mut self,
        person: PersonRef,
        image: Vec<u8>,
        return_url: impl Into<String>,
        mailbox: &mut HandoffMailbox,
    ) -> Result<HandoffKey, WizardError> {
        let key = self.person_key(person)?;
        mailbox.post_capture(CaptureRequest {
            key: key.clone(),
            image,
            return_url: return_url.into(),
        });
        Ok(key)
    }

    /// Check the mailbox on mount/update and attach any completed uploads
    /// belonging to this form. Each result is consumed exactly once.
    pub fn absorb_photo_results(&mut self, mailbox: &mut HandoffMailbox) -> usize {
        let mut candidates = vec![PersonRef::Applicant];
        if self.form.family.spouse().is_some() {
            candidates.push(PersonRef::Spouse);
        }
        for child in self.form.family.children() {
            candidates.push(PersonRef::Child(child.id));
        }

        let mut attached = 0;
        for person in candidates {
            let key = HandoffKey {
                form_id: self.form.form_id.clone(),
                person,
            };
            if let Some(result) = mailbox.take_result(&key) {
                self.attach_photo(person, result.photo);
                attached += 1;
            }
        }
        if attached > 0 {
            self.touch();
        }
        attached
    }

    fn attach_photo(&mut self, person: PersonRef, photo: PhotoRef) {
        let attachment = Some(PhotoAttachment::Uploaded(photo));
        match person {
            PersonRef::Applicant => self.form.applicant_photo = attachment,
            PersonRef::Spouse => {
                if let Some(id) = self.form.family.spouse().map(|spouse| spouse.id) {
                    if let Some(member) = self.form.family.member_mut(id) {
                        member.photo = attachment;
                    }
                }
            }
            PersonRef::Child(id) => {
                if let Some(member) = self.form.family.member_mut(id) {
                    member.photo = attachment;
                }
            }
        }
    }

    /// Delete a person's photo from storage and detach it from the form.
    pub fn remove_photo(
        &mut self,
        person: PersonRef,
        uploader: &impl PhotoUploader,
    ) -> Result<(), WizardError> {
        let key = self.person_key(person)?;
        uploader.delete(&key)?;
        match person {
            PersonRef::Applicant => self.form.applicant_photo = None,
            PersonRef::Spouse | PersonRef::Child(_) => {
                let id = match person {
                    PersonRef::Spouse => self.form.family.spouse().map(|spouse| spouse.id),
                    PersonRef::Child(id) => Some(id),
                    PersonRef::Applicant => None,
                };
                if let Some(id) = id {
                    if let Some(member) = self.form.family.member_mut(id) {
                        member.photo = None;
                    }
                }
            }
        }
        self.touch();
        Ok(())
    }

    fn committed_photo(&self) -> Option<PhotoRef> {
        match self.form.applicant_photo.as_ref() {
            Some(PhotoAttachment::Uploaded(photo)) if photo.size > 0 && !photo.url.is_empty() => {
                Some(photo.clone())
            }
            _ => None,
        }
    }

    // -- submission -------------------------------------------------------

    /// First phase of submission: gate on step, in-flight state, and a clean
    /// complete-form validation, then assemble the payload. The caller hands
    /// the payload to the gateway and reports back via
    /// [`finish_submission`](Self::finish_submission).
    pub fn begin_submission(&mut self, today: NaiveDate) -> Result<SubmissionPayload, WizardError> {
        if self.form.is_complete {
            return Err(WizardError::AlreadySubmitted);
        }
        if self.form.current_step != WizardStep::Review {
            return Err(WizardError::NotAtReview);
        }
        if self.submission_in_flight {
            return Err(WizardError::SubmissionInFlight);
        }

        let report = validate_complete_form(&self.form, today, &self.reference);
        if !report.is_valid() {
            let errors = report.errors.clone();
            self.last_report = report;
            return Err(WizardError::StepRejected { errors });
        }
        self.last_report = report;

        // Complete-form validation already required a committed photo.
        let primary_photo = self
            .committed_photo()
            .ok_or(WizardError::StepRejected {
                errors: vec![ValidationError::new(
                    "photo",
                    "A cropped and uploaded photograph is required",
                )],
            })?;

        self.submission_in_flight = true;
        self.top_level_error = None;
        info!(form_id = %self.form.form_id.0, "submission started");

        Ok(SubmissionPayload {
            form_id: self.form.form_id.clone(),
            applicant_data: ApplicantData {
                personal_info: self.form.personal_info.clone(),
                contact_info: self.form.contact_info.clone(),
                background_info: self.form.background_info.clone(),
            },
            family_members: self.form.family.members().cloned().collect(),
            primary_photo,
        })
    }

    /// Second phase: record the collaborator's answer. Success clears the
    /// draft (both keys together) and marks the form complete; failure keeps
    /// every byte of state so the user can retry.
    pub fn finish_submission(
        &mut self,
        outcome: Result<SubmissionReceipt, SubmissionError>,
    ) -> Result<SubmissionReceipt, WizardError> {
        self.submission_in_flight = false;
        match outcome {
            Ok(receipt) => {
                self.form.is_complete = true;
                self.scheduler.cancel();
                self.draft.clear()?;
                info!(form_id = %receipt.form_id, "submission confirmed, draft cleared");
                Ok(receipt)
            }
            Err(err) => {
                let message = err.to_string();
                warn!(form_id = %self.form.form_id.0, error = %message, "submission failed");
                self.top_level_error = Some(message.clone());
                Err(WizardError::SubmissionFailed(message))
            }
        }
    }

    /// Convenience wrapper composing both phases over a gateway.
    pub fn submit(
        &mut self,
        gateway: &impl SubmissionGateway,
        today: NaiveDate,
    ) -> Result<SubmissionReceipt, WizardError> {
        let payload = self.begin_submission(today)?;
        let outcome = gateway.submit(&payload);
        self.finish_submission(outcome)
    }
}
