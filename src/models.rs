use serde::{Deserialize, Serialize};

/// Category of item being queried or bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemType {
    /// Durable, non-consumable add-on.
    InAppPurchase,
    InAppPurchaseConsumable,
    #[default]
    Subscription,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetProductInfoRequest {
    #[serde(default)]
    pub item_type: ItemType,
    pub product_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetProductInfoResponse {
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obfuscated_account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obfuscated_profile_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_offer_token: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub product_id: String,
    #[serde(default)]
    pub item_type: ItemType,
    #[serde(flatten)]
    pub options: PurchaseOptions,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPurchasesRequest {
    #[serde(default)]
    pub item_type: ItemType,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPurchasesResponse {
    pub purchases: Vec<Purchase>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumePurchaseRequest {
    pub product_id: String,
    #[serde(default)]
    pub transaction_identifier: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumePurchaseResponse {
    pub success: bool,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcknowledgePurchaseRequest {
    pub purchase_token: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcknowledgePurchaseResponse {
    pub success: bool,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizePurchaseRequest {
    pub transaction_identifiers: Vec<String>,
}

/// Outcome of finalizing one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizedTransaction {
    pub id: String,
    pub success: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizePurchaseResponse {
    pub transactions: Vec<FinalizedTransaction>,
}

/// How an upgraded subscription is billed against the one it replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SubscriptionProrationMode {
    #[default]
    ImmediateWithTimeProration,
    ImmediateAndChargeProratedPrice,
    ImmediateWithoutProration,
    Deferred,
    ImmediateAndChargeFullPrice,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeSubscriptionRequest {
    pub new_product_id: String,
    pub purchase_token_of_original_subscription: String,
    #[serde(default)]
    pub proration_mode: SubscriptionProrationMode,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSubscriptionRequest {
    pub product_id: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSubscriptionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase: Option<Purchase>,
}

/// A product offered by the store, in the shape shared by every backend.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: String,
    pub name: String,
    pub description: String,
    /// Localized price, not including tax.
    pub localized_price: String,
    /// ISO 4217 currency code, e.g. "GBP".
    pub currency_code: String,
    /// Price in micro-units: "€7.99" is 7990000.
    pub micros_price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub windows_extras: Option<WindowsExtras>,
}

/// Product details only the Microsoft Store reports.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowsExtras {
    pub formatted_base_price: String,
    pub formatted_recurrence_price: String,
    pub extended_json_data: String,
    pub has_digital_download: bool,
    pub in_app_offer_token: String,
    pub is_in_user_collection: bool,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_uri: Option<String>,
    pub is_on_sale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_end_date: Option<i64>,
    /// Custom developer data. The store reports it per SKU, so this stays empty.
    pub tag: String,
    pub is_consumable: bool,
    pub is_unmanaged_consumable: bool,
    pub is_durable: bool,
    pub is_subscription: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_info: Option<WindowsSubscriptionInfo>,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowsSubscriptionInfo {
    pub skus: Vec<WindowsSkuInfo>,
    pub has_trial_options: bool,
    /// First non-trial SKU, falling back to the first SKU.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_sku: Option<WindowsSkuInfo>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowsSkuInfo {
    pub store_id: String,
    pub title: String,
    pub description: String,
    pub price: WindowsPriceInfo,
    pub is_subscription: bool,
    pub is_trial: bool,
    pub language: String,
    pub custom_developer_data: String,
    pub extended_json_data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_info: Option<WindowsStoreSubscriptionInfo>,
    pub availabilities: Vec<WindowsAvailabilityInfo>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowsPriceInfo {
    pub formatted_price: String,
    pub formatted_base_price: String,
    pub formatted_recurrence_price: String,
    pub unformatted_price: f64,
    pub unformatted_base_price: f64,
    pub unformatted_recurrence_price: f64,
    pub currency_code: String,
    pub is_on_sale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_end_date: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DurationUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowsStoreSubscriptionInfo {
    /// Number of billing periods, e.g. 1 for monthly or 12 for yearly.
    pub billing_period: u32,
    pub billing_period_unit: DurationUnit,
    pub has_trial_period: bool,
    pub trial_period: u32,
    pub trial_period_unit: DurationUnit,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowsAvailabilityInfo {
    pub store_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<i64>,
    pub price: WindowsPriceInfo,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    /// Transaction identifier.
    pub id: String,
    pub product_id: String,
    pub state: PurchaseState,
    pub purchase_token: String,
    /// Unix milliseconds.
    pub transaction_date: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<i64>,
    pub original_json: String,
}

/// Serialized as its numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseState {
    Purchased = 0,
    Canceled = 1,
    Pending = 2,
    Unknown = 3,
}

impl Serialize for PurchaseState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(*self as i32)
    }
}

impl<'de> Deserialize<'de> for PurchaseState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = i32::deserialize(deserializer)?;
        match value {
            0 => Ok(PurchaseState::Purchased),
            1 => Ok(PurchaseState::Canceled),
            2 => Ok(PurchaseState::Pending),
            3 => Ok(PurchaseState::Unknown),
            _ => Err(serde::de::Error::custom(format!(
                "Invalid purchase state: {value}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purchase_state_serializes_as_number() {
        assert_eq!(
            serde_json::to_string(&PurchaseState::Purchased)
                .expect("Failed to serialize Purchased state"),
            "0"
        );
        assert_eq!(
            serde_json::to_string(&PurchaseState::Unknown)
                .expect("Failed to serialize Unknown state"),
            "3"
        );
    }

    #[test]
    fn test_purchase_state_deserialize_invalid() {
        let err = serde_json::from_str::<PurchaseState>("7")
            .expect_err("Expected error for invalid state")
            .to_string();
        assert!(err.contains("Invalid purchase state: 7"));
    }

    #[test]
    fn test_item_type_wire_names() {
        let json = serde_json::to_string(&ItemType::InAppPurchaseConsumable)
            .expect("Failed to serialize ItemType");
        assert_eq!(json, r#""inAppPurchaseConsumable""#);
    }

    #[test]
    fn test_get_product_info_request_defaults_to_subscription() {
        let json = r#"{"productIds":["gold","silver"]}"#;
        let request: GetProductInfoRequest =
            serde_json::from_str(json).expect("Failed to deserialize GetProductInfoRequest");
        assert_eq!(request.item_type, ItemType::Subscription);
        assert_eq!(request.product_ids, vec!["gold", "silver"]);
    }

    #[test]
    fn test_purchase_request_flattens_options() {
        let json = r#"{"productId":"pro","itemType":"inAppPurchase","obfuscatedAccountId":"acc1"}"#;
        let request: PurchaseRequest =
            serde_json::from_str(json).expect("Failed to deserialize PurchaseRequest");
        assert_eq!(request.product_id, "pro");
        assert_eq!(request.item_type, ItemType::InAppPurchase);
        assert_eq!(request.options.obfuscated_account_id.as_deref(), Some("acc1"));
        assert_eq!(request.options.sub_offer_token, None);
    }

    #[test]
    fn test_consume_request_defaults() {
        let json = r#"{"productId":"coins"}"#;
        let request: ConsumePurchaseRequest =
            serde_json::from_str(json).expect("Failed to deserialize ConsumePurchaseRequest");
        assert_eq!(request.quantity, 1);
        assert!(request.transaction_identifier.is_empty());
    }

    #[test]
    fn test_finalize_response_serde() {
        let response = FinalizePurchaseResponse {
            transactions: vec![FinalizedTransaction {
                id: "txn-1".to_string(),
                success: true,
            }],
        };
        let json =
            serde_json::to_string(&response).expect("Failed to serialize FinalizePurchaseResponse");
        assert_eq!(json, r#"{"transactions":[{"id":"txn-1","success":true}]}"#);
    }

    #[test]
    fn test_upgrade_request_default_proration() {
        let json = r#"{"newProductId":"pro_yearly","purchaseTokenOfOriginalSubscription":"tok"}"#;
        let request: UpgradeSubscriptionRequest =
            serde_json::from_str(json).expect("Failed to deserialize UpgradeSubscriptionRequest");
        assert_eq!(
            request.proration_mode,
            SubscriptionProrationMode::ImmediateWithTimeProration
        );
    }

    #[test]
    fn test_product_without_extras_skips_field() {
        let product = Product {
            product_id: "gold".to_string(),
            name: "Gold".to_string(),
            description: "Gold tier".to_string(),
            localized_price: "$4.99".to_string(),
            currency_code: "USD".to_string(),
            micros_price: 4_990_000,
            windows_extras: None,
        };
        let json = serde_json::to_string(&product).expect("Failed to serialize Product");
        assert!(json.contains(r#""localizedPrice":"$4.99""#));
        assert!(json.contains(r#""microsPrice":4990000"#));
        assert!(!json.contains("windowsExtras"));
    }

    #[test]
    fn test_purchase_optional_expiration() {
        let purchase = Purchase {
            id: "txn".to_string(),
            product_id: "gold".to_string(),
            state: PurchaseState::Purchased,
            purchase_token: String::new(),
            transaction_date: 1_700_000_000_000,
            expiration_date: None,
            original_json: String::new(),
        };
        let json = serde_json::to_string(&purchase).expect("Failed to serialize Purchase");
        assert!(!json.contains("expirationDate"));
        assert!(json.contains(r#""state":0"#));

        let parsed: Purchase = serde_json::from_str(&json).expect("Failed to deserialize Purchase");
        assert_eq!(parsed, purchase);
    }
}
