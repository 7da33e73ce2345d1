//! Global error type definitions

use std::ops::Deref;

use thiserror::Error;

use crate::object::DomainObject;

#[derive(Debug, Error)]
#[error("unknown object type: {0}")]
/// The requested object type has not been registered
///
/// This is fatal to the creation attempt and is returned to the caller as is.
pub struct UnknownType(pub String);

#[derive(Debug, Error)]
#[error("cannot apply patch to '{path}': {reason}")]
/// A patch path addresses a property that does not exist on the target
///
/// This points to a bug in whatever produced the patch (usually a form
/// definition that does not match the object type), so it is never
/// recovered from.
pub struct MalformedPatchPath {
    pub path: String,
    pub reason: String,
}

impl MalformedPatchPath {
    pub(crate) fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
#[error(transparent)]
/// An error reported by one of the external collaborators
pub struct ServiceError(Box<dyn std::error::Error + Send + Sync>);

impl ServiceError {
    pub fn new<E: Into<Box<dyn std::error::Error + Send + Sync>>>(err: E) -> Self {
        Self(err.into())
    }
}

impl Deref for ServiceError {
    type Target = Box<dyn std::error::Error + Send + Sync>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, Error)]
#[error("failed to save object '{}': {source}", .object.identifier())]
/// The store refused or failed to save a newly created object
///
/// The user has been notified by the time the caller receives this, the
/// object is returned for diagnostics.
pub struct PersistenceFailure {
    pub object: Box<DomainObject>,
    #[source]
    pub source: ServiceError,
}

#[derive(Debug, Error)]
#[error("unexpected state after save, this may be a bug: {0:?}")]
/// Something failed after the object was already persisted
///
/// The save is not rolled back, the object stays in the store but may
/// not be linked to its parent or navigated to.
pub struct PostSaveError(#[from] anyhow::Error);

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    UnknownType(#[from] UnknownType),

    #[error(transparent)]
    MalformedPatch(#[from] MalformedPatchPath),

    #[error(transparent)]
    Persistence(#[from] PersistenceFailure),

    #[error(transparent)]
    PostSave(#[from] PostSaveError),
}
