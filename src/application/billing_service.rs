use crate::domain::errors::DomainError;
use crate::domain::party::{BillingContact, BillingUserRef};
use crate::domain::ports::BillingRepository;
use crate::domain::principal::AdminPrincipal;

pub struct BillingService<R> {
    repo: R,
}

impl<R: BillingRepository> BillingService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the existing billing user for the same `(mobile_no, email)`
    /// instead of creating a duplicate.
    pub fn register(
        &self,
        principal: AdminPrincipal,
        contact: BillingContact,
    ) -> Result<BillingUserRef, DomainError> {
        let user = self.repo.register(principal.admin_id, contact.normalized()?)?;
        if user.created {
            log::info!("Billing user {} registered", user.id);
        }
        Ok(user)
    }
}
