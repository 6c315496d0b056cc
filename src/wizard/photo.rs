//! Photo capture handoff between the form view and the separate crop view.
//!
//! The two views never call each other; they exchange work through
//! [`HandoffMailbox`], a single-slot-per-key mailbox over an ephemeral,
//! session-scoped store. The form view posts the raw capture, the crop view
//! takes it, uploads the cropped result, and posts the completed reference
//! back; the form view consumes that exactly once. The mailbox assumes a
//! single session: two tabs sharing one store can still race each other.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::FormId;
use super::roster::MemberId;

/// Reference to a photo that finished uploading to the photo-storage
/// collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRef {
    pub name: String,
    pub url: String,
    pub size: u64,
}

/// A person's photo: either raw bytes still awaiting upload, or a committed
/// upload reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoAttachment {
    Pending(Vec<u8>),
    Uploaded(PhotoRef),
}

impl PhotoAttachment {
    /// Whether this attachment satisfies the photo-step gate. A zero-byte raw
    /// file or an upload that came back without a URL counts as no photo.
    pub fn is_committed(&self) -> bool {
        match self {
            PhotoAttachment::Pending(_) => false,
            PhotoAttachment::Uploaded(photo) => !photo.url.is_empty() && photo.size > 0,
        }
    }
}

/// Which person on the entry a capture belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonRef {
    Applicant,
    Spouse,
    Child(MemberId),
}

impl PersonRef {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Applicant => "applicant",
            Self::Spouse => "spouse",
            Self::Child(_) => "child",
        }
    }
}

/// Mailbox key: one pending capture and one completed result per tuple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HandoffKey {
    pub form_id: FormId,
    pub person: PersonRef,
}

/// Raw image posted by the form view for the crop view to pick up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureRequest {
    pub key: HandoffKey,
    pub image: Vec<u8>,
    pub return_url: String,
}

/// Cropped-and-uploaded result posted back by the crop view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedHandoff {
    pub key: HandoffKey,
    pub photo: PhotoRef,
}

/// The ephemeral shared store, typed as an explicit mailbox so the
/// single-producer/single-consumer contract lives in the API instead of in a
/// convention over string keys.
#[derive(Debug, Default)]
pub struct HandoffMailbox {
    captures: BTreeMap<HandoffKey, CaptureRequest>,
    results: BTreeMap<HandoffKey, CompletedHandoff>,
}

impl HandoffMailbox {
    /// Post a raw capture. A second capture for the same key overwrites the
    /// first rather than queueing behind it.
    pub fn post_capture(&mut self, request: CaptureRequest) {
        self.captures.insert(request.key.clone(), request);
    }

    pub fn take_capture(&mut self, key: &HandoffKey) -> Option<CaptureRequest> {
        self.captures.remove(key)
    }

    pub fn pending_capture(&self, key: &HandoffKey) -> bool {
        self.captures.contains_key(key)
    }

    /// Post a completed result, overwriting any earlier one for the key.
    pub fn post_result(&mut self, result: CompletedHandoff) {
        self.results.insert(result.key.clone(), result);
    }

    /// Consume the completed result for `key`, removing it so a later mount
    /// cannot reprocess it.
    pub fn take_result(&mut self, key: &HandoffKey) -> Option<CompletedHandoff> {
        self.results.remove(key)
    }
}

/// Payload handed to the photo-storage collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    pub key: HandoffKey,
    pub image: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("photo storage unavailable: {0}")]
    Transport(String),
    #[error("photo storage rejected the upload: {0}")]
    Rejected(String),
}

/// External photo-storage collaborator.
pub trait PhotoUploader {
    fn upload(&self, request: UploadRequest) -> Result<PhotoRef, UploadError>;
    fn delete(&self, key: &HandoffKey) -> Result<(), UploadError>;
}

#[derive(Debug, thiserror::Error)]
pub enum HandoffError {
    #[error("no pending capture for {0:?}")]
    NoPendingCapture(HandoffKey),
    #[error(transparent)]
    Upload(#[from] UploadError),
}

/// Crop-view side of the protocol: take the raw capture, upload the cropped
/// bytes, post the result back, and leave the capture slot clear. On upload
/// failure the capture is restored so the user can retry the crop.
pub fn complete_capture(
    mailbox: &mut HandoffMailbox,
    key: &HandoffKey,
    cropped: Vec<u8>,
    uploader: &impl PhotoUploader,
) -> Result<PhotoRef, HandoffError> {
    let capture = mailbox
        .take_capture(key)
        .ok_or_else(|| HandoffError::NoPendingCapture(key.clone()))?;

    let upload = UploadRequest {
        key: key.clone(),
        image: cropped,
    };
    let photo = match uploader.upload(upload) {
        Ok(photo) => photo,
        Err(err) => {
            mailbox.post_capture(capture);
            return Err(err.into());
        }
    };

    mailbox.post_result(CompletedHandoff {
        key: key.clone(),
        photo: photo.clone(),
    });
    Ok(photo)
}
