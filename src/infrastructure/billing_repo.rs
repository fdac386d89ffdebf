use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::party::{BillingContact, BillingUserRef};
use crate::domain::ports::BillingRepository;
use crate::schema::billing_users;

use super::models::NewBillingUserRow;

pub struct DieselBillingRepository {
    pool: DbPool,
}

impl DieselBillingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl BillingRepository for DieselBillingRepository {
    /// `contact` must already be normalized; the unique key is
    /// `(mobile_no, email)`.
    fn register(
        &self,
        admin_id: Uuid,
        contact: BillingContact,
    ) -> Result<BillingUserRef, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let candidate = Uuid::new_v4();
            let inserted = diesel::insert_into(billing_users::table)
                .values(&NewBillingUserRow {
                    id: candidate,
                    admin_id,
                    name: contact.name,
                    mobile_no: contact.mobile_no.clone(),
                    whatsapp_no: contact.whatsapp_no,
                    email: contact.email.clone(),
                    address: contact.address,
                    dob: contact.dob,
                    gender: contact.gender,
                })
                .on_conflict((billing_users::mobile_no, billing_users::email))
                .do_nothing()
                .execute(conn)?;

            if inserted == 1 {
                return Ok(BillingUserRef {
                    id: candidate,
                    created: true,
                });
            }

            let id = billing_users::table
                .filter(billing_users::mobile_no.eq(&contact.mobile_no))
                .filter(billing_users::email.eq(&contact.email))
                .select(billing_users::id)
                .first(conn)?;
            Ok(BillingUserRef { id, created: false })
        })
    }
}
