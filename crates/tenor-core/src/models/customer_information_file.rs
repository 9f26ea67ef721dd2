//! Customer information file (KYC record) domain model.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Required length of a national identity number.
pub const NIK_LENGTH: usize = 16;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerInformationFile {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub cif_number: String,
    pub nik: String,
    pub full_name: String,
    pub legal_name: String,
    pub place_of_birth: String,
    pub date_of_birth: NaiveDate,
    pub gender: Option<String>,
    pub salary: Decimal,
    /// Blob key of the identity card photo.
    pub card_photo: String,
    /// Blob key of the selfie photo.
    pub selfie_photo: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCustomerInformationFile {
    pub cif_number: String,
    pub nik: String,
    pub full_name: String,
    pub legal_name: String,
    pub place_of_birth: String,
    pub date_of_birth: NaiveDate,
    pub gender: Option<String>,
    pub salary: Decimal,
    pub card_photo: String,
    pub selfie_photo: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCustomerInformationFile {
    pub full_name: Option<String>,
    pub legal_name: Option<String>,
    pub place_of_birth: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    /// `Some(Some(v))` = set, `Some(None)` = clear, `None` = no change.
    pub gender: Option<Option<String>>,
    pub salary: Option<Decimal>,
}
