use uuid::Uuid;

/// An admin identity already verified by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminPrincipal {
    pub admin_id: Uuid,
}

/// A venue employee identity already verified by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmployeePrincipal {
    pub employee_id: Uuid,
}
