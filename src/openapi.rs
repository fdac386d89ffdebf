use utoipa::OpenApi;

use crate::handlers::{billing, catalog, checkin, issued_passes, orders, payments};

#[derive(OpenApi)]
#[openapi(
    info(title = "Ticketing service", description = "Orders, payments, issued passes and check-in"),
    paths(
        catalog::create_event,
        catalog::create_sub_event,
        catalog::get_sub_event,
        catalog::resize_sub_event,
        catalog::set_sub_event_active,
        catalog::list_passes,
        catalog::create_pass,
        billing::register_billing_user,
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        payments::initiate_payment,
        payments::phonepe_callback,
        payments::sync_payment,
        payments::force_confirm,
        issued_passes::issue_sponsored,
        issued_passes::get_issued_pass,
        checkin::check_in,
        checkin::scan,
        checkin::todays_check_ins,
    ),
    tags(
        (name = "catalog", description = "Events, sub-events and passes"),
        (name = "billing", description = "Billing users"),
        (name = "orders", description = "Order placement"),
        (name = "payments", description = "PhonePe checkout and reconciliation"),
        (name = "issued-passes", description = "Passes held by attendees"),
        (name = "checkin", description = "Entry at the gate"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/order/create"));
        assert!(paths.contains_key("/payment/phonepe/callback"));
        assert!(paths.contains_key("/checkin/scan"));
        assert_eq!(paths.len(), 20);
    }
}
