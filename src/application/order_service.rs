use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{CreateOrderInput, ListResult, OrderView};
use crate::domain::ports::OrderRepository;
use crate::domain::principal::AdminPrincipal;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

pub struct OrderService<R> {
    repo: R,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_order(
        &self,
        principal: AdminPrincipal,
        input: CreateOrderInput,
    ) -> Result<Uuid, DomainError> {
        if input.attendees.is_empty() {
            return Err(DomainError::invalid("at least one attendee is required"));
        }
        self.repo.create(principal.admin_id, input)
    }

    pub fn get_order(&self, id: Uuid) -> Result<OrderView, DomainError> {
        self.repo
            .find_by_id(id)?
            .ok_or_else(|| DomainError::not_found("Order"))
    }

    /// Pages are 1-based; `limit` is clamped to `1..=MAX_PAGE_SIZE`.
    pub fn list_orders(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let page = page.max(1);
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        if (page - 1).checked_mul(limit).is_none() {
            return Err(DomainError::invalid("page is out of range"));
        }
        self.repo.list(page, limit)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingRepo {
        list_calls: Mutex<Vec<(i64, i64)>>,
    }

    impl OrderRepository for RecordingRepo {
        fn create(&self, _: Uuid, _: CreateOrderInput) -> Result<Uuid, DomainError> {
            Ok(Uuid::new_v4())
        }

        fn find_by_id(&self, _: Uuid) -> Result<Option<OrderView>, DomainError> {
            Ok(None)
        }

        fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
            self.list_calls.lock().unwrap().push((page, limit));
            Ok(ListResult {
                items: vec![],
                total: 0,
            })
        }
    }

    fn admin() -> AdminPrincipal {
        AdminPrincipal {
            admin_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn list_clamps_page_and_limit() {
        let service = OrderService::new(RecordingRepo::default());
        service.list_orders(0, 500).unwrap();
        service.list_orders(3, 0).unwrap();
        assert_eq!(
            *service.repo.list_calls.lock().unwrap(),
            vec![(1, MAX_PAGE_SIZE), (3, 1)]
        );
    }

    #[test]
    fn page_past_the_offset_range_is_rejected() {
        let service = OrderService::new(RecordingRepo::default());
        let err = service.list_orders(i64::MAX, 20).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert!(service.repo.list_calls.lock().unwrap().is_empty());
    }

    #[test]
    fn missing_order_is_not_found() {
        let service = OrderService::new(RecordingRepo::default());
        let err = service.get_order(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn order_without_attendees_is_rejected() {
        let service = OrderService::new(RecordingRepo::default());
        let err = service
            .create_order(
                admin(),
                CreateOrderInput {
                    sub_event_id: Uuid::new_v4(),
                    billing_user_id: Uuid::new_v4(),
                    total_amount: 0.into(),
                    attendees: vec![],
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }
}
