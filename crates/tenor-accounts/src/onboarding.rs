//! Customer sign-up.
//!
//! Photos are written to the blob store before the registration, which
//! creates the customer, the information file and one limit bucket per
//! term in a single transaction. If registration fails the photos are
//! removed again.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tenor_blob::BlobStore;
use tenor_core::error::{TenorError, TenorResult};
use tenor_core::models::customer::{CustomerRegistration, RegisteredCustomer};
use tenor_core::models::customer_information_file::{NIK_LENGTH, NewCustomerInformationFile};
use tenor_core::models::customer_limit::LIMIT_TERMS;
use tenor_core::models::normalize_email;
use tenor_core::repository::{CustomerInformationFileRepository, CustomerRepository};
use tenor_lending::{Clock, DailySequence};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::OnboardingConfig;
use crate::credentials::{PasswordRules, check_email, require};
use crate::photo;

const CARD_PHOTO_DIR: &str = "customer/card-photo";
const SELFIE_PHOTO_DIR: &str = "customer/selfie-photo";

#[derive(Debug, Clone)]
pub struct SignUp {
    pub name: String,
    pub email: String,
    pub password: String,
    pub nik: String,
    pub full_name: String,
    pub legal_name: String,
    pub place_of_birth: String,
    pub date_of_birth: NaiveDate,
    pub gender: Option<String>,
    pub salary: Decimal,
    pub card_photo: Vec<u8>,
    pub selfie_photo: Vec<u8>,
}

pub struct CustomerOnboarding<R, F, B, K> {
    customers: R,
    information: F,
    blobs: B,
    clock: K,
    cif_numbers: DailySequence,
    max_photo_bytes: usize,
    passwords: PasswordRules,
}

impl<R, F, B, K> CustomerOnboarding<R, F, B, K>
where
    R: CustomerRepository,
    F: CustomerInformationFileRepository,
    B: BlobStore,
    K: Clock,
{
    pub fn new(
        customers: R,
        information: F,
        blobs: B,
        clock: K,
        config: &OnboardingConfig,
        passwords: PasswordRules,
    ) -> Self {
        Self {
            customers,
            information,
            blobs,
            clock,
            cif_numbers: DailySequence::new(config.cif_prefix.clone()),
            max_photo_bytes: config.max_photo_bytes,
            passwords,
        }
    }

    /// Register a new, inactive customer with empty limit buckets.
    pub async fn sign_up(&self, input: SignUp) -> TenorResult<RegisteredCustomer> {
        let now = self.clock.now();

        // 1. Validate the form and both photos.
        self.validate(&input, now)?;
        let card_kind = photo::validate("card_photo", &input.card_photo, self.max_photo_bytes)?;
        let selfie_kind =
            photo::validate("selfie_photo", &input.selfie_photo, self.max_photo_bytes)?;

        // 2. One identity per NIK.
        if self.information.get_by_nik(&input.nik).await?.is_some() {
            return Err(TenorError::Conflict {
                constraint: "idx_cif_nik".into(),
            });
        }

        // 3. Store the photos.
        let card_key = format!("{CARD_PHOTO_DIR}/{}.{}", Uuid::new_v4(), card_kind.extension());
        let selfie_key = format!(
            "{SELFIE_PHOTO_DIR}/{}.{}",
            Uuid::new_v4(),
            selfie_kind.extension()
        );
        self.blobs.put(&card_key, &input.card_photo)?;
        if let Err(err) = self.blobs.put(&selfie_key, &input.selfie_photo) {
            self.discard(&[&card_key]);
            return Err(err.into());
        }

        // 4. Register.
        let cif_number = self.next_cif_number(now).await;
        let registration = CustomerRegistration {
            name: input.name.trim().to_string(),
            email: normalize_email(&input.email),
            password: input.password,
            information: NewCustomerInformationFile {
                cif_number,
                nik: input.nik,
                full_name: input.full_name.trim().to_string(),
                legal_name: input.legal_name.trim().to_string(),
                place_of_birth: input.place_of_birth.trim().to_string(),
                date_of_birth: input.date_of_birth,
                gender: input.gender,
                salary: input.salary,
                card_photo: card_key.clone(),
                selfie_photo: selfie_key.clone(),
            },
            limit_terms: LIMIT_TERMS.to_vec(),
        };

        match self.customers.register(registration).await {
            Ok(registered) => {
                info!(
                    customer_id = %registered.customer.id,
                    cif_number = %registered.information.cif_number,
                    "Customer signed up"
                );
                Ok(registered)
            }
            Err(err) => {
                self.discard(&[&card_key, &selfie_key]);
                Err(err)
            }
        }
    }

    fn validate(&self, input: &SignUp, now: DateTime<Utc>) -> TenorResult<()> {
        require("name", &input.name)?;
        require("full_name", &input.full_name)?;
        require("legal_name", &input.legal_name)?;
        require("place_of_birth", &input.place_of_birth)?;
        check_email(input.email.trim())?;

        if input.nik.chars().count() != NIK_LENGTH {
            return Err(TenorError::validation(format!(
                "nik length must be {NIK_LENGTH}"
            )));
        }
        if input.date_of_birth >= now.date_naive() {
            return Err(TenorError::validation("date_of_birth must be in the past"));
        }
        if input.salary <= Decimal::ZERO {
            return Err(TenorError::validation("salary must be greater than zero"));
        }
        self.passwords.check_new(&input.password)
    }

    async fn next_cif_number(&self, now: DateTime<Utc>) -> String {
        let (from, to) = DailySequence::day_window(now);
        let latest = self.information.latest_cif_number_between(from, to).await;
        self.cif_numbers.next_or_first(latest, now)
    }

    fn discard(&self, keys: &[&str]) {
        for key in keys {
            if let Err(err) = self.blobs.delete(key) {
                warn!(key = %key, error = %err, "Failed to remove orphaned photo");
            }
        }
    }
}
