use chrono::NaiveDate;
use uuid::Uuid;

use super::errors::DomainError;

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn normalize_phone(number: &str) -> String {
    number.trim().to_string()
}

#[derive(Debug, Clone)]
pub struct BillingContact {
    pub name: String,
    pub mobile_no: String,
    pub whatsapp_no: String,
    pub email: String,
    pub address: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
}

impl BillingContact {
    /// Normalizes the dedup key `(mobile_no, email)` and rejects blank
    /// identity fields.
    pub fn normalized(mut self) -> Result<Self, DomainError> {
        self.name = self.name.trim().to_string();
        self.mobile_no = normalize_phone(&self.mobile_no);
        self.whatsapp_no = normalize_phone(&self.whatsapp_no);
        self.email = normalize_email(&self.email);
        if self.name.is_empty() || self.mobile_no.is_empty() || self.email.is_empty() {
            return Err(DomainError::invalid("name, mobile_no and email are required"));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone)]
pub struct BillingUserRef {
    pub id: Uuid,
    pub created: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendeeContact {
    pub name: String,
    pub whatsapp_no: String,
    pub email: String,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
}

impl AttendeeContact {
    /// Normalizes the dedup key `(whatsapp_no, email)`.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.whatsapp_no = normalize_phone(&self.whatsapp_no);
        self.email = normalize_email(&self.email);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn billing_contact_key_is_normalized() {
        let contact = BillingContact {
            name: " Asha Rao ".to_string(),
            mobile_no: " 9876543210 ".to_string(),
            whatsapp_no: "9876543210".to_string(),
            email: "  Asha.Rao@Example.COM ".to_string(),
            address: None,
            dob: None,
            gender: None,
        }
        .normalized()
        .unwrap();

        assert_eq!(contact.name, "Asha Rao");
        assert_eq!(contact.mobile_no, "9876543210");
        assert_eq!(contact.email, "asha.rao@example.com");
    }

    #[test]
    fn billing_contact_requires_identity_fields() {
        let contact = BillingContact {
            name: "Asha".to_string(),
            mobile_no: "   ".to_string(),
            whatsapp_no: String::new(),
            email: "asha@example.com".to_string(),
            address: None,
            dob: None,
            gender: None,
        };
        assert!(matches!(contact.normalized(), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn attendee_contacts_differing_only_in_case_collapse() {
        let a = AttendeeContact {
            name: "Ravi".to_string(),
            whatsapp_no: "9000000001 ".to_string(),
            email: "RAVI@example.com".to_string(),
            dob: None,
            gender: None,
        };
        let b = AttendeeContact {
            email: " ravi@example.com".to_string(),
            whatsapp_no: " 9000000001".to_string(),
            ..a.clone()
        };
        assert_eq!(a.normalized(), b.normalized());
    }
}
