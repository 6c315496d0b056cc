use std::sync::Mutex;
use std::time::Duration;

use chrono::NaiveDate;

use crate::wizard::controller::{DateInput, WizardController};
use crate::wizard::domain::{EducationLevel, Gender, MaritalStatus};
use crate::wizard::draft::MemoryKvStore;
use crate::wizard::photo::{
    complete_capture, HandoffKey, HandoffMailbox, PersonRef, PhotoRef, PhotoUploader, UploadError,
    UploadRequest,
};
use crate::wizard::submission::{
    SubmissionError, SubmissionGateway, SubmissionPayload, SubmissionReceipt,
};
use crate::wizard::validation::reference::ReferenceData;

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date")
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn new_controller() -> WizardController<MemoryKvStore> {
    WizardController::resume(
        MemoryKvStore::default(),
        ReferenceData::default(),
        Duration::from_millis(0),
    )
    .expect("controller starts")
}

pub(super) fn fill_personal(controller: &mut WizardController<MemoryKvStore>) {
    controller.update_personal_info(|personal| {
        personal.first_name = "Abebe".to_string();
        personal.last_name = "Kebede".to_string();
        personal.gender = Some(Gender::Male);
        personal.place_of_birth = "Addis Ababa".to_string();
        personal.country_of_birth = "Ethiopia".to_string();
    });
    controller
        .set_applicant_date_of_birth(DateInput::Gregorian(date(1990, 5, 15)))
        .expect("valid date of birth");
}

pub(super) fn fill_contact(controller: &mut WizardController<MemoryKvStore>) {
    controller.update_contact_info(|contact| {
        contact.address = "Bole Road 12, Addis Ababa".to_string();
        contact.phone = "0911223344".to_string();
        contact.email = "abebe.kebede@example.com".to_string();
        contact.passport_number = "EP1234567".to_string();
    });
    controller
        .set_passport_expiry(DateInput::Gregorian(date(2030, 1, 1)))
        .expect("valid expiry");
}

pub(super) fn fill_background(controller: &mut WizardController<MemoryKvStore>) {
    controller.update_background_info(|background| {
        background.education_level = Some(EducationLevel::UniversityDegree);
        background.marital_status = Some(MaritalStatus::Single);
        background.occupation = "Engineer".to_string();
    });
}

/// Run the capture/crop/upload round trip for the applicant so the photo
/// step gate is satisfied.
pub(super) fn attach_applicant_photo(controller: &mut WizardController<MemoryKvStore>) {
    let mut mailbox = HandoffMailbox::default();
    let uploader = MemoryUploader::default();
    let key = controller
        .request_photo_capture(PersonRef::Applicant, vec![1, 2, 3], "/wizard/5", &mut mailbox)
        .expect("capture posted");
    complete_capture(&mut mailbox, &key, vec![1, 2, 3, 4], &uploader).expect("crop uploads");
    assert_eq!(controller.absorb_photo_results(&mut mailbox), 1);
}

/// Fill every section and advance the wizard all the way to the review step.
pub(super) fn advance_to_review(controller: &mut WizardController<MemoryKvStore>) {
    fill_personal(controller);
    fill_contact(controller);
    fill_background(controller);
    for _ in 0..4 {
        controller.advance(today()).expect("step passes");
    }
    attach_applicant_photo(controller);
    controller.advance(today()).expect("photo step passes");
}

#[derive(Default)]
pub(super) struct MemoryUploader {
    pub(super) uploads: Mutex<Vec<UploadRequest>>,
    pub(super) deletes: Mutex<Vec<HandoffKey>>,
}

impl PhotoUploader for MemoryUploader {
    fn upload(&self, request: UploadRequest) -> Result<PhotoRef, UploadError> {
        let photo = PhotoRef {
            name: "photo.jpg".to_string(),
            url: format!(
                "https://photos.example/{}/{}",
                request.key.form_id.0,
                request.key.person.label()
            ),
            size: request.image.len() as u64,
        };
        self.uploads
            .lock()
            .expect("uploader mutex poisoned")
            .push(request);
        Ok(photo)
    }

    fn delete(&self, key: &HandoffKey) -> Result<(), UploadError> {
        self.deletes
            .lock()
            .expect("uploader mutex poisoned")
            .push(key.clone());
        Ok(())
    }
}

pub(super) struct FailingUploader;

impl PhotoUploader for FailingUploader {
    fn upload(&self, _request: UploadRequest) -> Result<PhotoRef, UploadError> {
        Err(UploadError::Transport("photo storage offline".to_string()))
    }

    fn delete(&self, _key: &HandoffKey) -> Result<(), UploadError> {
        Err(UploadError::Transport("photo storage offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryGateway {
    pub(super) calls: Mutex<Vec<SubmissionPayload>>,
}

impl SubmissionGateway for MemoryGateway {
    fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, SubmissionError> {
        let mut calls = self.calls.lock().expect("gateway mutex poisoned");
        calls.push(payload.clone());
        Ok(SubmissionReceipt {
            form_id: format!("DV-2026-{:06}", calls.len()),
        })
    }
}

pub(super) struct FailingGateway;

impl SubmissionGateway for FailingGateway {
    fn submit(&self, _payload: &SubmissionPayload) -> Result<SubmissionReceipt, SubmissionError> {
        Err(SubmissionError::Transport("network unreachable".to_string()))
    }
}
