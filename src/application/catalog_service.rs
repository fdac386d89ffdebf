use uuid::Uuid;

use crate::domain::catalog::{EventView, NewEvent, NewPass, NewSubEvent, PassView, SubEventView};
use crate::domain::errors::DomainError;
use crate::domain::ports::CatalogRepository;
use crate::domain::principal::AdminPrincipal;

pub struct CatalogService<R> {
    repo: R,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_event(
        &self,
        principal: AdminPrincipal,
        mut event: NewEvent,
    ) -> Result<EventView, DomainError> {
        event.name = event.name.trim().to_string();
        if event.name.is_empty() {
            return Err(DomainError::invalid("event name is required"));
        }
        self.repo.create_event(principal.admin_id, event)
    }

    pub fn create_sub_event(
        &self,
        principal: AdminPrincipal,
        sub_event: NewSubEvent,
    ) -> Result<SubEventView, DomainError> {
        let available = sub_event.initial_availability()?;
        let created = self.repo.create_sub_event(sub_event, available)?;
        log::info!(
            "Sub-event {} created by {} with {} places",
            created.id,
            principal.admin_id,
            created.quantity
        );
        Ok(created)
    }

    pub fn get_sub_event(&self, id: Uuid) -> Result<SubEventView, DomainError> {
        self.repo
            .find_sub_event(id)?
            .ok_or_else(|| DomainError::not_found("Sub-event"))
    }

    pub fn resize_sub_event(
        &self,
        principal: AdminPrincipal,
        id: Uuid,
        quantity: i32,
    ) -> Result<SubEventView, DomainError> {
        let resized = self.repo.resize_sub_event(id, quantity)?;
        log::info!(
            "Sub-event {} resized to {} by {}",
            id,
            quantity,
            principal.admin_id
        );
        Ok(resized)
    }

    pub fn set_sub_event_active(
        &self,
        principal: AdminPrincipal,
        id: Uuid,
        active: bool,
    ) -> Result<SubEventView, DomainError> {
        log::info!(
            "Sub-event {} active={} set by {}",
            id,
            active,
            principal.admin_id
        );
        self.repo.set_sub_event_active(id, active)
    }

    pub fn create_pass(
        &self,
        principal: AdminPrincipal,
        pass: NewPass,
    ) -> Result<PassView, DomainError> {
        let final_price = pass.final_price()?;
        self.repo.create_pass(principal.admin_id, pass, final_price)
    }

    pub fn list_passes(&self, sub_event_id: Uuid) -> Result<Vec<PassView>, DomainError> {
        self.repo.list_passes(sub_event_id)
    }
}
