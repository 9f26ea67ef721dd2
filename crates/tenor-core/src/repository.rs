//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Single-record lookups return
//! `Ok(None)` when nothing matches; list operations take a
//! [`Pagination`] and a structured [`Filter`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{TenorError, TenorResult};
use crate::filter::Filter;
use crate::models::{
    customer::{Customer, CustomerRegistration, RegisteredCustomer, UpdateCustomer},
    customer_information_file::{CustomerInformationFile, UpdateCustomerInformationFile},
    customer_limit::{CustomerLimit, LimitApproval},
    installment::TransactionInstallment,
    transaction::{LoanBooking, LoanTransaction},
    user::{CreateUser, UpdateUser, User},
    variable_global::{CreateVariableGlobal, VariableGlobal},
};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PER_PAGE: u64 = 10;
pub const DEFAULT_ORDER_BY: &str = "created_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Pagination, ordering and free-text search for list queries.
#[derive(Debug, Clone, PartialEq)]
pub struct Pagination {
    /// 1-based page number.
    pub page: u64,
    pub per_page: u64,
    pub order_by: String,
    pub direction: SortDirection,
    /// Case-insensitive substring matched against the entity's search
    /// columns.
    pub query: Option<String>,
    /// Return every matching row on a single page.
    pub all: bool,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
            order_by: DEFAULT_ORDER_BY.into(),
            direction: SortDirection::Desc,
            query: None,
            all: false,
        }
    }
}

impl Pagination {
    pub fn all() -> Self {
        Self {
            all: true,
            ..Self::default()
        }
    }

    pub fn page(page: u64, per_page: u64) -> Self {
        Self {
            page,
            per_page,
            ..Self::default()
        }
    }

    pub fn ordered_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by = field.into();
        self.direction = direction;
        self
    }

    /// Parse `page`, `limit`, `sort` (asc/desc), `order` (field),
    /// `query` and `get_all_data` from query-string pairs.
    ///
    /// Missing, zero or empty values fall back to the defaults.
    pub fn from_query_params<'a, I>(params: I) -> TenorResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut pagination = Self::default();
        for (key, raw) in params {
            if raw.is_empty() {
                continue;
            }
            match key {
                "page" => pagination.page = parse_positive(key, raw)?.unwrap_or(DEFAULT_PAGE),
                "limit" => {
                    pagination.per_page = parse_positive(key, raw)?.unwrap_or(DEFAULT_PER_PAGE)
                }
                "sort" => {
                    pagination.direction = match raw.to_ascii_lowercase().as_str() {
                        "asc" => SortDirection::Asc,
                        "desc" => SortDirection::Desc,
                        _ => return Err(TenorError::validation(format!("invalid sort '{raw}'"))),
                    }
                }
                "order" => pagination.order_by = raw.to_string(),
                "query" => pagination.query = Some(raw.to_string()),
                "get_all_data" => {
                    pagination.all = raw
                        .parse::<bool>()
                        .map_err(|_| TenorError::validation("get_all_data must be a boolean"))?
                }
                _ => {}
            }
        }
        Ok(pagination)
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        if self.all {
            0
        } else {
            (self.page.max(1) - 1) * self.per_page()
        }
    }

    /// Maximum number of rows to return.
    pub fn limit(&self) -> u64 {
        if self.all {
            i64::MAX as u64
        } else {
            self.per_page()
        }
    }

    fn per_page(&self) -> u64 {
        if self.per_page == 0 {
            DEFAULT_PER_PAGE
        } else {
            self.per_page
        }
    }
}

fn parse_positive(key: &str, raw: &str) -> TenorResult<Option<u64>> {
    let value = raw
        .parse::<u64>()
        .map_err(|_| TenorError::validation(format!("{key} must be a positive integer")))?;
    Ok((value > 0).then_some(value))
}

/// Page metadata returned alongside list results.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PageMeta {
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
    pub total_count: u64,
}

impl PageMeta {
    pub fn new(pagination: &Pagination, total_count: u64) -> Self {
        if pagination.all {
            return Self {
                page: 1,
                per_page: total_count,
                total_pages: u64::from(total_count > 0),
                total_count,
            };
        }
        let per_page = pagination.limit();
        Self {
            page: pagination.page.max(1),
            per_page,
            total_pages: total_count.div_ceil(per_page),
            total_count,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> PaginatedResult<T> {
    /// Replace every item, keeping the page metadata.
    pub fn with_items<U>(self, items: Vec<U>) -> PaginatedResult<U> {
        PaginatedResult {
            items,
            meta: self.meta,
        }
    }
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

pub trait CustomerRepository: Send + Sync {
    /// Create the customer, their information file and their limit
    /// buckets atomically.
    fn register(
        &self,
        input: CustomerRegistration,
    ) -> impl Future<Output = TenorResult<RegisteredCustomer>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = TenorResult<Option<Customer>>> + Send;

    fn get_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = TenorResult<Option<Customer>>> + Send;

    fn update(
        &self,
        id: Uuid,
        input: UpdateCustomer,
    ) -> impl Future<Output = TenorResult<Customer>> + Send;

    /// Soft delete: the customer is deactivated, never removed.
    fn delete(&self, id: Uuid) -> impl Future<Output = TenorResult<()>> + Send;

    fn list(
        &self,
        pagination: Pagination,
        filter: Filter,
    ) -> impl Future<Output = TenorResult<PaginatedResult<Customer>>> + Send;
}

pub trait CustomerInformationFileRepository: Send + Sync {
    fn get_by_customer(
        &self,
        customer_id: Uuid,
    ) -> impl Future<Output = TenorResult<Option<CustomerInformationFile>>> + Send;

    fn get_by_nik(
        &self,
        nik: &str,
    ) -> impl Future<Output = TenorResult<Option<CustomerInformationFile>>> + Send;

    fn update_by_customer(
        &self,
        customer_id: Uuid,
        input: UpdateCustomerInformationFile,
    ) -> impl Future<Output = TenorResult<CustomerInformationFile>> + Send;

    /// CIF number of the most recent file created in `[from, to)`.
    fn latest_cif_number_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl Future<Output = TenorResult<Option<String>>> + Send;
}

pub trait CustomerLimitRepository: Send + Sync {
    /// Lookup constrained to both the limit id and its owner.
    fn get_for_customer(
        &self,
        customer_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = TenorResult<Option<CustomerLimit>>> + Send;

    /// All buckets of a customer, ordered by term ascending.
    fn list_by_customer(
        &self,
        customer_id: Uuid,
    ) -> impl Future<Output = TenorResult<Vec<CustomerLimit>>> + Send;

    fn list(
        &self,
        pagination: Pagination,
        filter: Filter,
    ) -> impl Future<Output = TenorResult<PaginatedResult<CustomerLimit>>> + Send;

    /// Set approved amounts on the customer's buckets and activate both
    /// the buckets and the customer, atomically.
    fn approve(
        &self,
        customer_id: Uuid,
        approvals: Vec<LimitApproval>,
    ) -> impl Future<Output = TenorResult<Vec<CustomerLimit>>> + Send;
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

pub trait TransactionRepository: Send + Sync {
    /// Persist the transaction, its installments and every limit
    /// adjustment as one atomic unit.
    fn book(
        &self,
        booking: LoanBooking,
    ) -> impl Future<Output = TenorResult<LoanTransaction>> + Send;

    fn get_by_id(
        &self,
        id: Uuid,
    ) -> impl Future<Output = TenorResult<Option<LoanTransaction>>> + Send;

    fn get_for_customer(
        &self,
        customer_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = TenorResult<Option<LoanTransaction>>> + Send;

    fn list(
        &self,
        pagination: Pagination,
        filter: Filter,
    ) -> impl Future<Output = TenorResult<PaginatedResult<LoanTransaction>>> + Send;

    /// Contract number of the most recent transaction created in
    /// `[from, to)`.
    fn latest_contract_number_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl Future<Output = TenorResult<Option<String>>> + Send;
}

pub trait InstallmentRepository: Send + Sync {
    /// Installments of a transaction, ordered by term ascending.
    fn list_by_transaction(
        &self,
        transaction_id: Uuid,
    ) -> impl Future<Output = TenorResult<Vec<TransactionInstallment>>> + Send;
}

// ---------------------------------------------------------------------------
// Global variables
// ---------------------------------------------------------------------------

pub trait VariableGlobalRepository: Send + Sync {
    fn create(
        &self,
        input: CreateVariableGlobal,
    ) -> impl Future<Output = TenorResult<VariableGlobal>> + Send;

    fn get_by_code(
        &self,
        code: &str,
    ) -> impl Future<Output = TenorResult<Option<VariableGlobal>>> + Send;
}

// ---------------------------------------------------------------------------
// Staff users
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = TenorResult<User>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = TenorResult<Option<User>>> + Send;

    fn get_by_email(&self, email: &str) -> impl Future<Output = TenorResult<Option<User>>> + Send;

    fn update(&self, id: Uuid, input: UpdateUser) -> impl Future<Output = TenorResult<User>> + Send;

    /// Soft delete: the user is deactivated, never removed.
    fn delete(&self, id: Uuid) -> impl Future<Output = TenorResult<()>> + Send;

    fn list(
        &self,
        pagination: Pagination,
        filter: Filter,
    ) -> impl Future<Output = TenorResult<PaginatedResult<User>>> + Send;
}
