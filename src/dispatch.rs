//! Per-variant operation tables bridging dynamic routing to the typed service.
//!
//! Each registered record type contributes one monomorphized [`TypedOps`]
//! instance; handlers dispatch through the erased [`EntityOps`] object without
//! knowing the concrete type.

use crate::error::{AppError, StorageError};
use crate::record::Record;
use crate::service::RecordService;
use crate::validation::FieldViolation;
use async_trait::async_trait;
use serde_json::Value;
use std::any::Any;
use std::marker::PhantomData;

/// A parsed record in transit from the body binder to the operation table.
/// Produced and consumed by functions monomorphized over the same type, so
/// the downcast cannot fail by construction.
pub type DynRecord = Box<dyn Any + Send>;

/// Erased CRUD operations over one record variant. JSON values at the
/// boundary; typed records inside.
#[async_trait]
pub trait EntityOps: Send + Sync {
    async fn find_all(&self, svc: &RecordService) -> Result<Value, AppError>;
    async fn find_one(&self, svc: &RecordService, id: i64) -> Result<Option<Value>, AppError>;
    async fn create(&self, svc: &RecordService, body: DynRecord) -> Result<Value, AppError>;
    async fn update(&self, svc: &RecordService, id: i64, body: DynRecord)
        -> Result<Value, AppError>;
    async fn delete(&self, svc: &RecordService, id: i64) -> Result<(), AppError>;
    async fn count(&self, svc: &RecordService) -> Result<u64, AppError>;
}

pub(crate) struct TypedOps<T: Record>(PhantomData<fn() -> T>);

impl<T: Record> TypedOps<T> {
    pub(crate) fn boxed() -> Box<dyn EntityOps> {
        Box::new(TypedOps::<T>(PhantomData))
    }
}

#[async_trait]
impl<T: Record> EntityOps for TypedOps<T> {
    async fn find_all(&self, svc: &RecordService) -> Result<Value, AppError> {
        let records = svc.find_all::<T>().await?;
        to_value(&records)
    }

    async fn find_one(&self, svc: &RecordService, id: i64) -> Result<Option<Value>, AppError> {
        match svc.find_one::<T>(id).await? {
            Some(rec) => Ok(Some(to_value(&rec)?)),
            None => Ok(None),
        }
    }

    async fn create(&self, svc: &RecordService, body: DynRecord) -> Result<Value, AppError> {
        let rec = downcast::<T>(body)?;
        let created = svc.create::<T>(*rec).await?;
        to_value(&created)
    }

    async fn update(
        &self,
        svc: &RecordService,
        id: i64,
        body: DynRecord,
    ) -> Result<Value, AppError> {
        let mut rec = downcast::<T>(body)?;
        if let Some(body_id) = rec.id() {
            if body_id != id {
                return Err(AppError::BadRequest(format!(
                    "body id {} does not match path id {}",
                    body_id, id
                )));
            }
        }
        rec.set_id(id);
        let updated = svc.update::<T>(*rec).await?;
        to_value(&updated)
    }

    async fn delete(&self, svc: &RecordService, id: i64) -> Result<(), AppError> {
        svc.delete::<T>(id).await
    }

    async fn count(&self, svc: &RecordService) -> Result<u64, AppError> {
        svc.count::<T>().await
    }
}

/// Deserialize a request body against the concrete record type.
pub(crate) fn parse_record<T: Record>(bytes: &[u8]) -> Result<DynRecord, serde_json::Error> {
    serde_json::from_slice::<T>(bytes).map(|rec| Box::new(rec) as DynRecord)
}

/// Run the concrete type's declared validation rules.
pub(crate) fn validate_record<T: Record>(rec: &DynRecord) -> Vec<FieldViolation> {
    rec.downcast_ref::<T>().map(|r| r.check()).unwrap_or_default()
}

fn downcast<T: Record>(rec: DynRecord) -> Result<Box<T>, AppError> {
    rec.downcast::<T>().map_err(|_| {
        AppError::BadRequest(format!("body does not match entity '{}'", T::META.name))
    })
}

fn to_value<S: serde::Serialize>(value: &S) -> Result<Value, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::Storage(StorageError::Encoding(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::Note;

    #[test]
    fn parse_then_validate_round_trip() {
        let parsed = parse_record::<Note>(br#"{"description":"hello"}"#).expect("parses");
        assert!(validate_record::<Note>(&parsed).is_empty());
        let note = parsed.downcast::<Note>().expect("note");
        assert_eq!(note.id, None);
        assert_eq!(note.description.as_deref(), Some("hello"));
    }

    #[test]
    fn parse_rejects_malformed_json() {
        assert!(parse_record::<Note>(b"{\"description\":").is_err());
    }

    #[test]
    fn validate_reports_declared_violations() {
        let long = "x".repeat(300);
        let body = format!(r#"{{"description":"{}"}}"#, long);
        let parsed = parse_record::<Note>(body.as_bytes()).expect("parses");
        let violations = validate_record::<Note>(&parsed);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "description");
    }
}
