//! Authenticatable principals and where to find them.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tenor_core::error::TenorResult;
use tenor_core::models::customer::Customer;
use tenor_core::models::user::User;
use tenor_core::repository::{CustomerRepository, UserRepository};
use uuid::Uuid;

/// A principal that can sign in and carry a token.
///
/// The serialized form is embedded in access tokens, so implementors
/// must never serialize their password hash.
pub trait Subject: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Realm tag written into tokens; a token from one realm is rejected
    /// by another.
    const KIND: &'static str;

    fn id(&self) -> Uuid;
    fn email(&self) -> &str;
    fn password_hash(&self) -> &str;
    fn is_active(&self) -> bool;
}

impl Subject for Customer {
    const KIND: &'static str = "customer";

    fn id(&self) -> Uuid {
        self.id
    }

    fn email(&self) -> &str {
        &self.email
    }

    fn password_hash(&self) -> &str {
        &self.password_hash
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl Subject for User {
    const KIND: &'static str = "staff";

    fn id(&self) -> Uuid {
        self.id
    }

    fn email(&self) -> &str {
        &self.email
    }

    fn password_hash(&self) -> &str {
        &self.password_hash
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

/// Lookup of subjects by id and by email.
pub trait SubjectStore: Send + Sync {
    type Subject: Subject;

    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl Future<Output = TenorResult<Option<Self::Subject>>> + Send;

    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = TenorResult<Option<Self::Subject>>> + Send;
}

/// Customers as authentication subjects.
#[derive(Clone)]
pub struct CustomerDirectory<R>(pub R);

impl<R: CustomerRepository> SubjectStore for CustomerDirectory<R> {
    type Subject = Customer;

    async fn find_by_id(&self, id: Uuid) -> TenorResult<Option<Customer>> {
        self.0.get_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> TenorResult<Option<Customer>> {
        self.0.get_by_email(email).await
    }
}

/// Staff users as authentication subjects.
#[derive(Clone)]
pub struct StaffDirectory<R>(pub R);

impl<R: UserRepository> SubjectStore for StaffDirectory<R> {
    type Subject = User;

    async fn find_by_id(&self, id: Uuid) -> TenorResult<Option<User>> {
        self.0.get_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> TenorResult<Option<User>> {
        self.0.get_by_email(email).await
    }
}
