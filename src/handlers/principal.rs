//! Identity headers set by the upstream identity provider.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use uuid::Uuid;

use crate::domain::principal::{AdminPrincipal, EmployeePrincipal};
use crate::errors::AppError;

pub const ADMIN_HEADER: &str = "X-Admin-Id";
pub const EMPLOYEE_HEADER: &str = "X-Employee-Id";

fn header_uuid(req: &HttpRequest, name: &str) -> Result<Uuid, AppError> {
    let raw = req
        .headers()
        .get(name)
        .ok_or_else(|| AppError::Unauthorized(format!("missing {name} header")))?;
    raw.to_str()
        .ok()
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .ok_or_else(|| AppError::Unauthorized(format!("{name} is not a valid id")))
}

impl FromRequest for AdminPrincipal {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(header_uuid(req, ADMIN_HEADER).map(|admin_id| AdminPrincipal { admin_id }))
    }
}

impl FromRequest for EmployeePrincipal {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            header_uuid(req, EMPLOYEE_HEADER).map(|employee_id| EmployeePrincipal { employee_id }),
        )
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[actix_web::test]
    async fn admin_header_is_parsed() {
        let id = Uuid::new_v4();
        let req = TestRequest::default()
            .insert_header((ADMIN_HEADER, id.to_string()))
            .to_http_request();
        let principal = AdminPrincipal::extract(&req).await.unwrap();
        assert_eq!(principal.admin_id, id);
    }

    #[actix_web::test]
    async fn missing_header_is_unauthorized() {
        let req = TestRequest::default().to_http_request();
        let err = EmployeePrincipal::extract(&req).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[actix_web::test]
    async fn malformed_header_is_unauthorized() {
        let req = TestRequest::default()
            .insert_header((EMPLOYEE_HEADER, "gate-7"))
            .to_http_request();
        let err = EmployeePrincipal::extract(&req).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
