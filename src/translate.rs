//! Translation of store outcomes into domain values or typed failures.

use uuid::Uuid;

use crate::error::{Error, PurchaseError};
use crate::models::{ItemType, Purchase, PurchaseState};
use crate::store::{
    ConsumableResult, ConsumableStatus, PurchaseResult, PurchaseStatus, CONSUMABLE, DURABLE,
    UNMANAGED_CONSUMABLE,
};

/// Store product kinds to query for an item type.
pub fn product_filter(item_type: ItemType) -> Vec<&'static str> {
    match item_type {
        ItemType::InAppPurchase => vec![DURABLE],
        ItemType::InAppPurchaseConsumable => vec![CONSUMABLE, UNMANAGED_CONSUMABLE],
        // Subscriptions are durable add-ons
        ItemType::Subscription => vec![DURABLE],
    }
}

/// Turns the result of a purchase request into a purchase or a rejection.
///
/// The store does not hand out transaction ids, so a successful purchase gets
/// a fresh one.
pub fn purchase_outcome(
    result: PurchaseResult,
    product_id: &str,
    now: i64,
) -> crate::Result<Purchase> {
    let PurchaseResult {
        status,
        extended_error,
    } = result;

    let (error, fallback) = match status {
        PurchaseStatus::Succeeded => {
            return Ok(Purchase {
                id: Uuid::new_v4().to_string(),
                product_id: product_id.to_string(),
                state: PurchaseState::Purchased,
                purchase_token: String::new(),
                transaction_date: now,
                expiration_date: None,
                original_json: String::new(),
            })
        }
        PurchaseStatus::AlreadyPurchased => (PurchaseError::AlreadyOwned, ""),
        PurchaseStatus::NotPurchased => {
            (PurchaseError::UserCancelled, "User cancelled the purchase")
        }
        PurchaseStatus::NetworkError => {
            (PurchaseError::ProductRequestFailed, "Network error occurred")
        }
        PurchaseStatus::ServerError => {
            (PurchaseError::ServiceUnavailable, "Server error occurred")
        }
        PurchaseStatus::Other(code) => {
            log::debug!("unrecognized purchase status {code} for {product_id}");
            (PurchaseError::GeneralError, "Unknown purchase error")
        }
    };

    Err(Error::purchase(
        error,
        extended_error.unwrap_or_else(|| fallback.to_string()),
    ))
}

/// Turns the result of a fulfillment report into `true` or a rejection.
pub fn consumable_outcome(result: ConsumableResult) -> crate::Result<bool> {
    let error = match result.status {
        ConsumableStatus::Succeeded => return Ok(true),
        ConsumableStatus::InsufficientQuantity => PurchaseError::InsufficientQuantity,
        ConsumableStatus::NetworkError => PurchaseError::ProductRequestFailed,
        ConsumableStatus::ServerError => PurchaseError::ServiceUnavailable,
        ConsumableStatus::Other(code) => {
            log::debug!("unrecognized consumable status {code}");
            PurchaseError::GeneralError
        }
    };

    Err(Error::purchase(error, result.extended_error.unwrap_or_default()))
}

/// A license counts as active until its expiration; one expiring exactly now
/// does not.
pub fn is_license_active(expiration_date: Option<i64>, now: i64) -> bool {
    expiration_date.map_or(true, |expires| expires > now)
}

/// Case-insensitive prefix match of a SKU store id against a product id.
/// Non-ASCII letters are folded too.
pub fn matches_product_family(sku_store_id: &str, product_id: &str) -> bool {
    sku_store_id
        .to_lowercase()
        .starts_with(&product_id.to_lowercase())
}

/// Parses a formatted price such as "$1,299.99" or "9.99 €".
///
/// Everything except digits, `.` and `,` is dropped first. `,` is read as a
/// group separator, so it must follow a digit and may not follow the decimal
/// point. Returns 0 for empty or unparsable input.
pub fn parse_price(formatted: &str) -> f64 {
    let clean: String = formatted
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();

    if clean.starts_with(',') {
        return 0.0;
    }
    if let Some(dot) = clean.find('.') {
        if clean[dot..].contains(',') {
            return 0.0;
        }
    }

    clean.replace(',', "").parse::<f64>().unwrap_or(0.0)
}

/// Price in micro-units, where 1,000,000 micro-units equal one currency unit.
pub fn price_to_micros(price: f64) -> i64 {
    (price * 1_000_000.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purchase_result(status: PurchaseStatus, message: Option<&str>) -> PurchaseResult {
        PurchaseResult {
            status,
            extended_error: message.map(str::to_string),
        }
    }

    fn consumable_result(status: ConsumableStatus) -> ConsumableResult {
        ConsumableResult {
            status,
            extended_error: None,
        }
    }

    #[test]
    fn test_succeeded_purchase_gets_generated_transaction_id() {
        let purchase = purchase_outcome(
            purchase_result(PurchaseStatus::Succeeded, None),
            "gold",
            1_700_000_000_000,
        )
        .expect("Succeeded status should yield a purchase");

        assert_eq!(purchase.product_id, "gold");
        assert_eq!(purchase.state, PurchaseState::Purchased);
        assert_eq!(purchase.transaction_date, 1_700_000_000_000);
        assert!(purchase.purchase_token.is_empty());
        assert!(Uuid::parse_str(&purchase.id).is_ok());
    }

    #[test]
    fn test_transaction_ids_are_unique() {
        let first = purchase_outcome(purchase_result(PurchaseStatus::Succeeded, None), "a", 0)
            .expect("first purchase");
        let second = purchase_outcome(purchase_result(PurchaseStatus::Succeeded, None), "a", 0)
            .expect("second purchase");
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_every_purchase_status_maps_to_one_outcome() {
        let cases = [
            (PurchaseStatus::AlreadyPurchased, PurchaseError::AlreadyOwned),
            (PurchaseStatus::NotPurchased, PurchaseError::UserCancelled),
            (PurchaseStatus::NetworkError, PurchaseError::ProductRequestFailed),
            (PurchaseStatus::ServerError, PurchaseError::ServiceUnavailable),
            (PurchaseStatus::Other(42), PurchaseError::GeneralError),
            (PurchaseStatus::Other(-1), PurchaseError::GeneralError),
        ];

        for (status, expected) in cases {
            let err = purchase_outcome(purchase_result(status, None), "gold", 0)
                .expect_err("non-success status should be rejected");
            assert_eq!(err.purchase_error(), Some(expected), "status {status:?}");
        }
    }

    #[test]
    fn test_not_purchased_default_message() {
        let err = purchase_outcome(purchase_result(PurchaseStatus::NotPurchased, None), "gold", 0)
            .expect_err("NotPurchased should be rejected");
        assert_eq!(err.to_string(), "User cancelled the purchase");
    }

    #[test]
    fn test_vendor_message_takes_precedence() {
        let err = purchase_outcome(
            purchase_result(PurchaseStatus::ServerError, Some("Store is down")),
            "gold",
            0,
        )
        .expect_err("ServerError should be rejected");
        assert_eq!(err.to_string(), "Store is down");
        assert_eq!(err.purchase_error(), Some(PurchaseError::ServiceUnavailable));
    }

    #[test]
    fn test_consumable_succeeded() {
        assert!(consumable_outcome(consumable_result(ConsumableStatus::Succeeded))
            .expect("Succeeded should yield true"));
    }

    #[test]
    fn test_consumable_statuses() {
        let cases = [
            (
                ConsumableStatus::InsufficientQuantity,
                PurchaseError::InsufficientQuantity,
            ),
            (ConsumableStatus::NetworkError, PurchaseError::ProductRequestFailed),
            (ConsumableStatus::ServerError, PurchaseError::ServiceUnavailable),
            (ConsumableStatus::Other(9), PurchaseError::GeneralError),
        ];

        for (status, expected) in cases {
            let err = consumable_outcome(consumable_result(status))
                .expect_err("non-success status should be rejected");
            assert_eq!(err.purchase_error(), Some(expected), "status {status:?}");
        }
    }

    #[test]
    fn test_subscription_filter_includes_durable() {
        assert!(product_filter(ItemType::Subscription).contains(&"Durable"));
        assert_eq!(product_filter(ItemType::InAppPurchase), vec!["Durable"]);
        assert_eq!(
            product_filter(ItemType::InAppPurchaseConsumable),
            vec!["Consumable", "UnmanagedConsumable"]
        );
    }

    #[test]
    fn test_license_expiring_now_is_inactive() {
        let now = 1_700_000_000_000;
        assert!(!is_license_active(Some(now), now));
        assert!(!is_license_active(Some(now - 1), now));
        assert!(is_license_active(Some(now + 1), now));
        assert!(is_license_active(None, now));
    }

    #[test]
    fn test_product_family_prefix_is_case_insensitive() {
        assert!(matches_product_family("9NBLGGH4R315/0010", "9nblggh4r315"));
        assert!(matches_product_family("pro_monthly", "pro"));
        assert!(!matches_product_family("pro", "pro_monthly"));
        assert!(!matches_product_family("basic_monthly", "pro"));
        assert!(matches_product_family("ÉTÉ_PASS/0010", "été_pass"));
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("$4.99"), 4.99);
        assert_eq!(parse_price("1,299.50 kr"), 1299.5);
        assert_eq!(parse_price("€ 12"), 12.0);
        assert_eq!(parse_price(""), 0.0);
        assert_eq!(parse_price("Free"), 0.0);
        assert_eq!(parse_price("1.2.3"), 0.0);
        assert_eq!(parse_price("1.234,56"), 0.0);
        assert_eq!(parse_price(",99"), 0.0);
        assert_eq!(parse_price("$,99"), 0.0);
        assert_eq!(parse_price(".99"), 0.99);
    }

    #[test]
    fn test_price_to_micros_rounds() {
        assert_eq!(price_to_micros(7.99), 7_990_000);
        assert_eq!(price_to_micros(0.0), 0);
    }
}
