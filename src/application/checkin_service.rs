use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::checkin::{
    CheckInClock, CheckInCommand, CheckInMethod, CheckInOutcome, CheckingRecordView,
};
use crate::domain::errors::DomainError;
use crate::domain::ports::CheckInRepository;
use crate::domain::principal::EmployeePrincipal;

pub struct CheckInService<R> {
    repo: R,
    clock: CheckInClock,
}

impl<R: CheckInRepository> CheckInService<R> {
    pub fn new(repo: R, clock: CheckInClock) -> Self {
        Self { repo, clock }
    }

    pub fn check_in(
        &self,
        employee: EmployeePrincipal,
        issued_pass_id: Uuid,
        method: CheckInMethod,
        checked_in_by: Option<String>,
    ) -> Result<CheckInOutcome, DomainError> {
        self.check_in_at(employee, issued_pass_id, method, checked_in_by, Utc::now())
    }

    /// Admits the attendee on their most recent active pass for the sub-event.
    pub fn scan(
        &self,
        employee: EmployeePrincipal,
        attendee_id: Uuid,
        sub_event_id: Uuid,
    ) -> Result<CheckInOutcome, DomainError> {
        let now = Utc::now();
        let issued_pass_id = self
            .repo
            .find_active_pass_for_attendee(attendee_id, sub_event_id, self.clock.today(now))?
            .ok_or_else(|| DomainError::not_found("Active pass for attendee"))?;
        self.check_in_at(employee, issued_pass_id, CheckInMethod::QrScan, None, now)
    }

    pub fn todays_check_ins(
        &self,
        sub_event_id: Uuid,
    ) -> Result<Vec<CheckingRecordView>, DomainError> {
        let (start, end) = self.clock.day_bounds(self.clock.today(Utc::now()));
        self.repo.records_between(sub_event_id, start, end)
    }

    fn check_in_at(
        &self,
        employee: EmployeePrincipal,
        issued_pass_id: Uuid,
        method: CheckInMethod,
        checked_in_by: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<CheckInOutcome, DomainError> {
        let command = CheckInCommand {
            issued_pass_id,
            employee_id: employee.employee_id,
            method,
            checked_in_by,
        };
        self.repo.check_in(command, now, self.clock.today(now))
    }
}
