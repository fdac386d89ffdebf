use chrono::Utc;
use uuid::Uuid;

use crate::domain::checkin::CheckInClock;
use crate::domain::errors::DomainError;
use crate::domain::issuance::{IssuedPassView, SponsoredPassInput};
use crate::domain::ports::IssuanceRepository;
use crate::domain::principal::AdminPrincipal;

pub struct IssuanceService<R> {
    repo: R,
    clock: CheckInClock,
}

impl<R: IssuanceRepository> IssuanceService<R> {
    pub fn new(repo: R, clock: CheckInClock) -> Self {
        Self { repo, clock }
    }

    pub fn issue_sponsored(
        &self,
        principal: AdminPrincipal,
        input: SponsoredPassInput,
    ) -> Result<IssuedPassView, DomainError> {
        let issued = self.repo.issue_sponsored(input)?;
        log::info!(
            "Sponsored pass {} issued to attendee {} by {}",
            issued.id,
            issued.attendee_id,
            principal.admin_id
        );
        Ok(issued)
    }

    pub fn get_issued_pass(&self, id: Uuid) -> Result<IssuedPassView, DomainError> {
        self.repo
            .find_issued_pass(id, self.clock.today(Utc::now()))?
            .ok_or_else(|| DomainError::not_found("Issued pass"))
    }
}
