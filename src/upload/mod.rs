//! Two-phase upload with compensating delete
//!
//! Creating a package-like entity is a metadata POST followed by a payload
//! transfer to a pre-authorized URL. The uploader here owns the rollback
//! obligation: a failed transfer deletes the metadata record created in
//! phase 1 before the failure is reported.

pub mod models;
pub mod uploader;

pub use models::{UploadPayload, UploadReceipt, UploadResult, UploadTarget};
pub use uploader::{CompensatingUploader, UploaderOptions};
