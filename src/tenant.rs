//! Tenant scoping.
//!
//! Every core operation receives a [`TenantContext`] naming the acting café
//! and employee. Entities loaded by id are passed through
//! [`TenantContext::claim`] before anything is read from or written to them.

use std::future::Future;
use std::pin::Pin;

use actix_identity::IdentityExt;
use actix_web::{dev::Payload, web::Data, FromRequest, HttpRequest};
use serde::Serialize;

use crate::{db, errors::AppError, AppState};

/// Implemented by every row that belongs to exactly one café.
pub trait TenantOwned {
    fn caffe_id(&self) -> i64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TenantContext {
    caffe_id: i64,
    employee_id: i64,
}

impl TenantContext {
    pub fn new(caffe_id: i64, employee_id: i64) -> Self {
        Self {
            caffe_id,
            employee_id,
        }
    }

    pub fn caffe_id(&self) -> i64 {
        self.caffe_id
    }

    pub fn employee_id(&self) -> i64 {
        self.employee_id
    }

    /// Fails with [`AppError::CrossTenant`] unless `entity` belongs to the
    /// acting café.
    pub fn authorize<T: TenantOwned + ?Sized>(&self, entity: &T) -> Result<(), AppError> {
        let owner = entity.caffe_id();
        if owner != self.caffe_id {
            log::warn!(
                "Employee {} of caffe {} tried to reach an entity of caffe {}",
                self.employee_id,
                self.caffe_id,
                owner
            );
            return Err(AppError::CrossTenant {
                actor_caffe: self.caffe_id,
                owner_caffe: owner,
            });
        }
        Ok(())
    }

    /// Resolves a lookup by id: missing rows are `NotFound`, rows of another
    /// café are `CrossTenant`.
    pub fn claim<T: TenantOwned>(&self, found: Option<T>) -> Result<T, AppError> {
        let entity = found.ok_or(AppError::NotFound)?;
        self.authorize(&entity)?;
        Ok(entity)
    }

    /// Resolves an id a form refers to (an expense's company, a product's
    /// unit, ...). An unknown id is a field error; an id of another café is
    /// still `CrossTenant`.
    pub fn reference<T: TenantOwned>(&self, found: Option<T>, field: &str) -> Result<T, AppError> {
        let entity = found.ok_or_else(|| AppError::invalid(field, INVALID_CHOICE))?;
        self.authorize(&entity)?;
        Ok(entity)
    }
}

pub const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

/// The session identity is the employee id; the café is derived from the
/// employee row on every request.
impl FromRequest for TenantContext {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let identity = req.get_identity();
        let state = req.app_data::<Data<AppState>>().cloned();

        Box::pin(async move {
            let identity = identity.map_err(|_| AppError::Unauthorized)?;
            let employee_id: i64 = identity
                .id()
                .map_err(|e| AppError::IdentityError(e.to_string()))?
                .parse()
                .map_err(|_| AppError::Unauthorized)?;
            let state = state.ok_or_else(|| {
                AppError::ConfigError("application state is not registered".to_owned())
            })?;

            let employee = db::employees::find_employee(&state, employee_id)
                .await?
                .ok_or(AppError::Unauthorized)?;

            Ok(TenantContext::new(employee.caffe_id, employee.id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Owned(i64);

    impl TenantOwned for Owned {
        fn caffe_id(&self) -> i64 {
            self.0
        }
    }

    #[test]
    fn own_entities_pass() {
        let ctx = TenantContext::new(1, 10);
        assert!(ctx.authorize(&Owned(1)).is_ok());
        assert_eq!(ctx.claim(Some(Owned(1))).unwrap().0, 1);
    }

    #[test]
    fn foreign_entities_are_cross_tenant() {
        let ctx = TenantContext::new(2, 20);
        let err = ctx.claim(Some(Owned(1))).err().unwrap();
        assert!(matches!(
            err,
            AppError::CrossTenant {
                actor_caffe: 2,
                owner_caffe: 1
            }
        ));
        assert!(err.is_not_found());
    }

    #[test]
    fn missing_entities_are_not_found() {
        let ctx = TenantContext::new(1, 10);
        assert!(matches!(ctx.claim::<Owned>(None), Err(AppError::NotFound)));
    }

    #[test]
    fn unknown_references_are_field_errors() {
        let ctx = TenantContext::new(1, 10);
        let err = ctx.reference::<Owned>(None, "company").err().unwrap();
        let errors = err.field_errors().unwrap();
        assert_eq!(errors.get("company").unwrap(), &vec![INVALID_CHOICE.to_owned()]);

        let err = ctx.reference(Some(Owned(3)), "company").err().unwrap();
        assert!(matches!(err, AppError::CrossTenant { .. }));
    }
}
