//! Vendor-neutral view of a platform commerce client.
//!
//! A backend answers with plain records so that status translation and the
//! billing flows never touch platform types.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::DurationUnit;

/// Product kinds used to filter store queries.
pub const DURABLE: &str = "Durable";
pub const CONSUMABLE: &str = "Consumable";
pub const UNMANAGED_CONSUMABLE: &str = "UnmanagedConsumable";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseStatus {
    Succeeded,
    AlreadyPurchased,
    NotPurchased,
    NetworkError,
    ServerError,
    /// A status value this crate does not know about.
    Other(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumableStatus {
    Succeeded,
    InsufficientQuantity,
    NetworkError,
    ServerError,
    Other(i32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseResult {
    pub status: PurchaseStatus,
    /// Message of the vendor's extended error, if it reported one.
    pub extended_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConsumableResult {
    pub status: ConsumableStatus,
    pub extended_error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StorePrice {
    pub formatted_price: String,
    pub formatted_base_price: String,
    pub formatted_recurrence_price: String,
    pub currency_code: Option<String>,
    pub is_on_sale: bool,
    pub sale_end_date: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreSubscriptionInfo {
    pub billing_period: u32,
    pub billing_period_unit: DurationUnit,
    pub has_trial_period: bool,
    pub trial_period: u32,
    pub trial_period_unit: DurationUnit,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreAvailability {
    pub store_id: String,
    pub end_date: Option<i64>,
    pub price: StorePrice,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSku {
    pub store_id: String,
    pub title: String,
    pub description: String,
    pub price: StorePrice,
    pub is_subscription: bool,
    pub is_trial: bool,
    pub language: String,
    pub custom_developer_data: String,
    pub extended_json_data: String,
    pub subscription_info: Option<StoreSubscriptionInfo>,
    pub availabilities: Vec<StoreAvailability>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreProduct {
    pub store_id: String,
    pub title: String,
    pub description: String,
    pub product_kind: String,
    pub price: StorePrice,
    pub extended_json_data: String,
    pub has_digital_download: bool,
    pub in_app_offer_token: String,
    pub is_in_user_collection: bool,
    pub language: String,
    pub link_uri: Option<String>,
    pub keywords: Vec<String>,
    pub skus: Vec<StoreSku>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQueryResult {
    pub products: Vec<StoreProduct>,
    pub extended_error: Option<String>,
}

impl ProductQueryResult {
    pub fn find(&self, store_id: &str) -> Option<&StoreProduct> {
        self.products.iter().find(|p| p.store_id == store_id)
    }
}

/// The user's entitlement to one add-on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreLicense {
    pub sku_store_id: String,
    pub in_app_offer_token: String,
    pub is_active: bool,
    /// Unix milliseconds. `None` for licenses that never expire.
    pub expiration_date: Option<i64>,
    pub extended_json_data: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppLicense {
    pub add_on_licenses: Vec<StoreLicense>,
}

/// Upstream platform commerce client.
///
/// Each method is a single awaited request. Implementations report transport
/// or platform failures as [`crate::Error::Store`]; outcome statuses are
/// returned as data and translated by the caller.
#[async_trait]
pub trait StoreClient: Send + Sync {
    async fn query_products(
        &self,
        product_kinds: &[&str],
        store_ids: &[String],
    ) -> crate::Result<ProductQueryResult>;

    async fn request_purchase(&self, store_id: &str) -> crate::Result<PurchaseResult>;

    async fn report_consumable_fulfillment(
        &self,
        product_id: &str,
        quantity: u32,
        tracking_id: Uuid,
    ) -> crate::Result<ConsumableResult>;

    async fn app_license(&self) -> crate::Result<AppLicense>;
}
