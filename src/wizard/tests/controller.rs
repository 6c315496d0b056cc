use std::time::Instant;

use super::common::{
    advance_to_review, date, fill_background, fill_contact, fill_personal, new_controller, today,
    FailingGateway, MemoryGateway, MemoryUploader,
};
use crate::calendar::EthiopianDate;
use crate::wizard::controller::{DateInput, WizardController, WizardError};
use crate::wizard::domain::WizardStep;
use crate::wizard::draft::{DraftStore, MemoryKvStore};
use crate::wizard::photo::{HandoffMailbox, PersonRef};

#[test]
fn advance_is_gated_on_the_current_step() {
    let mut controller = new_controller();

    let err = controller.advance(today()).expect_err("blank step rejected");
    assert!(matches!(err, WizardError::StepRejected { .. }));
    assert_eq!(controller.current_step(), WizardStep::PersonalInfo);
    assert!(!controller.errors().is_empty());

    fill_personal(&mut controller);
    let step = controller.advance(today()).expect("filled step passes");
    assert_eq!(step, WizardStep::ContactInfo);
    // A passing validation replaces the previous error set wholesale.
    assert!(controller.errors().is_empty());
}

#[test]
fn retreat_is_unconditional_and_floored() {
    let mut controller = new_controller();
    fill_personal(&mut controller);
    controller.advance(today()).expect("advances");

    assert_eq!(controller.retreat(), WizardStep::PersonalInfo);
    assert_eq!(controller.retreat(), WizardStep::PersonalInfo);
}

#[test]
fn retreat_works_even_with_a_failing_current_step() {
    let mut controller = new_controller();
    fill_personal(&mut controller);
    controller.advance(today()).expect("advances");

    // Contact info is blank, so advancing fails, but going back must not.
    controller.advance(today()).expect_err("blank contact info");
    assert_eq!(controller.retreat(), WizardStep::PersonalInfo);
}

#[test]
fn ethiopian_dates_resolve_through_the_converter() {
    let mut controller = new_controller();
    controller
        .set_applicant_date_of_birth(DateInput::Ethiopian(EthiopianDate::new(1982, 1, 1)))
        .expect("valid Ethiopian date");
    assert_eq!(
        controller.form().personal_info.date_of_birth,
        Some(date(1989, 9, 11))
    );
}

#[test]
fn invalid_ethiopian_dates_surface_as_field_errors() {
    let mut controller = new_controller();
    // 1982 is not an Ethiopian leap year, so Pagume has only five days.
    let err = controller
        .set_applicant_date_of_birth(DateInput::Ethiopian(EthiopianDate::new(1982, 13, 6)))
        .expect_err("Pagume 6 rejected");
    match err {
        WizardError::InvalidDate(error) => assert_eq!(error.field, "date_of_birth"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(controller.form().personal_info.date_of_birth, None);
}

#[test]
fn member_edits_require_a_known_member() {
    let mut controller = new_controller();
    let child = controller.add_child();
    controller
        .set_member_date_of_birth(child, DateInput::Gregorian(date(2015, 2, 2)))
        .expect("known child");

    controller.remove_member(child).expect("removes");
    let err = controller
        .set_member_date_of_birth(child, DateInput::Gregorian(date(2015, 2, 2)))
        .expect_err("removed child");
    assert!(matches!(err, WizardError::Roster(_)));
}

#[test]
fn photo_capture_requires_a_known_person() {
    let mut controller = new_controller();
    let mut mailbox = HandoffMailbox::default();

    let err = controller
        .request_photo_capture(PersonRef::Spouse, vec![1], "/wizard/5", &mut mailbox)
        .expect_err("no spouse on the form");
    assert!(matches!(err, WizardError::UnknownPerson(PersonRef::Spouse)));

    controller.add_spouse().expect("spouse slot empty");
    controller
        .request_photo_capture(PersonRef::Spouse, vec![1], "/wizard/5", &mut mailbox)
        .expect("spouse now exists");
}

#[test]
fn absorbing_twice_attaches_nothing_the_second_time() {
    let mut controller = new_controller();
    let mut mailbox = HandoffMailbox::default();
    let uploader = MemoryUploader::default();

    let key = controller
        .request_photo_capture(PersonRef::Applicant, vec![1, 2], "/wizard/5", &mut mailbox)
        .expect("capture posted");
    crate::wizard::photo::complete_capture(&mut mailbox, &key, vec![1, 2, 3], &uploader)
        .expect("uploads");

    assert_eq!(controller.absorb_photo_results(&mut mailbox), 1);
    assert!(controller.form().applicant_photo.is_some());
    assert_eq!(controller.absorb_photo_results(&mut mailbox), 0);
}

#[test]
fn remove_photo_deletes_from_storage_and_detaches() {
    let mut controller = new_controller();
    let uploader = MemoryUploader::default();
    super::common::attach_applicant_photo(&mut controller);

    controller
        .remove_photo(PersonRef::Applicant, &uploader)
        .expect("deletes");
    assert!(controller.form().applicant_photo.is_none());
    assert_eq!(uploader.deletes.lock().expect("mutex").len(), 1);
}

#[test]
fn the_photo_step_blocks_until_a_photo_is_committed() {
    let mut controller = new_controller();
    fill_personal(&mut controller);
    fill_contact(&mut controller);
    fill_background(&mut controller);
    for _ in 0..4 {
        controller.advance(today()).expect("step passes");
    }
    assert_eq!(controller.current_step(), WizardStep::Photo);

    let err = controller.advance(today()).expect_err("no photo yet");
    assert!(matches!(err, WizardError::StepRejected { .. }));

    super::common::attach_applicant_photo(&mut controller);
    let step = controller.advance(today()).expect("photo committed");
    assert_eq!(step, WizardStep::Review);
}

#[test]
fn edits_flush_to_the_draft_store_on_tick() {
    let mut controller = new_controller();
    fill_personal(&mut controller);

    let wrote = controller.tick(Instant::now()).expect("flushes");
    assert!(wrote);
    let draft = controller
        .draft_store()
        .load()
        .expect("loads")
        .expect("draft present");
    assert_eq!(draft.personal_info.first_name, "Abebe");
}

#[test]
fn resume_restores_the_persisted_draft() {
    let mut controller = new_controller();
    fill_personal(&mut controller);
    controller.advance(today()).expect("advances");
    controller.tick(Instant::now()).expect("flushes");
    let form_id = controller.form_id().clone();

    let mut seed = DraftStore::new(MemoryKvStore::default());
    seed.save(controller.form()).expect("saves");
    let resumed = WizardController::resume(
        seed.into_inner(),
        Default::default(),
        std::time::Duration::from_millis(0),
    )
    .expect("resumes");

    assert_eq!(resumed.form_id(), &form_id);
    assert_eq!(resumed.current_step(), WizardStep::ContactInfo);
    assert_eq!(resumed.form().personal_info.first_name, "Abebe");
}

#[test]
fn a_corrupt_draft_yields_a_fresh_form() {
    use crate::wizard::draft::{KeyValueStore, DRAFT_KEY};

    let mut store = MemoryKvStore::default();
    store.put(DRAFT_KEY, "{mangled").expect("puts");

    let controller = WizardController::resume(
        store,
        Default::default(),
        std::time::Duration::from_millis(0),
    )
    .expect("resumes anyway");
    assert_eq!(controller.current_step(), WizardStep::PersonalInfo);
    assert!(controller.form().personal_info.first_name.is_empty());
}

#[test]
fn submission_calls_the_gateway_exactly_once_and_clears_the_draft() {
    let mut controller = new_controller();
    advance_to_review(&mut controller);
    controller.tick(Instant::now()).expect("draft persisted");
    assert!(controller.draft_store().load().expect("loads").is_some());

    let gateway = MemoryGateway::default();
    let receipt = controller.submit(&gateway, today()).expect("submits");

    assert_eq!(gateway.calls.lock().expect("mutex").len(), 1);
    assert_eq!(receipt.form_id, "DV-2026-000001");
    assert!(controller.form().is_complete);
    assert!(!controller.submission_in_flight());
    assert!(controller.draft_store().load().expect("loads").is_none());
}

#[test]
fn submission_is_only_available_from_review() {
    let mut controller = new_controller();
    let err = controller
        .submit(&MemoryGateway::default(), today())
        .expect_err("not at review");
    assert!(matches!(err, WizardError::NotAtReview));
}

#[test]
fn only_one_submission_may_be_in_flight() {
    let mut controller = new_controller();
    advance_to_review(&mut controller);

    let payload = controller.begin_submission(today()).expect("first begins");
    let err = controller
        .begin_submission(today())
        .expect_err("second blocked");
    assert!(matches!(err, WizardError::SubmissionInFlight));

    // Finishing the first releases the guard.
    use crate::wizard::submission::SubmissionGateway;
    let gateway = MemoryGateway::default();
    controller
        .finish_submission(gateway.submit(&payload))
        .expect("confirms");
    assert!(controller.form().is_complete);
}

#[test]
fn failed_submission_keeps_state_and_allows_retry() {
    let mut controller = new_controller();
    advance_to_review(&mut controller);
    controller.tick(Instant::now()).expect("draft persisted");

    let err = controller
        .submit(&FailingGateway, today())
        .expect_err("gateway down");
    assert!(matches!(err, WizardError::SubmissionFailed(_)));
    assert_eq!(
        controller.top_level_error(),
        Some("submission service unavailable: network unreachable")
    );
    assert!(!controller.form().is_complete);
    assert!(!controller.submission_in_flight());
    assert_eq!(controller.current_step(), WizardStep::Review);
    assert!(
        controller.draft_store().load().expect("loads").is_some(),
        "draft survives a failed submission"
    );

    controller
        .submit(&MemoryGateway::default(), today())
        .expect("retry succeeds");
    assert!(controller.top_level_error().is_none());
    assert!(controller.draft_store().load().expect("loads").is_none());
}

#[test]
fn a_submitted_entry_cannot_be_submitted_again() {
    let mut controller = new_controller();
    advance_to_review(&mut controller);
    controller
        .submit(&MemoryGateway::default(), today())
        .expect("submits");

    let err = controller
        .submit(&MemoryGateway::default(), today())
        .expect_err("already complete");
    assert!(matches!(err, WizardError::AlreadySubmitted));
}
