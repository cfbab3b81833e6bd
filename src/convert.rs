use crate::models::*;
use crate::store::{
    StoreAvailability, StoreLicense, StorePrice, StoreProduct, StoreSku, CONSUMABLE, DURABLE,
    UNMANAGED_CONSUMABLE,
};
use crate::translate::{parse_price, price_to_micros};

const DEFAULT_CURRENCY_CODE: &str = "USD";

/// 100-nanosecond ticks per millisecond.
const TICKS_PER_MILLI: i64 = 10_000;
/// Milliseconds between 1601-01-01 and 1970-01-01.
const MILLIS_TO_UNIX_EPOCH: i64 = 11_644_473_600_000;

/// Converts a Windows `DateTime` (100ns ticks since 1601) to Unix milliseconds.
/// A zero tick count means "not set".
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
pub(crate) fn ticks_to_unix_millis(ticks: i64) -> Option<i64> {
    (ticks != 0).then(|| ticks.div_euclid(TICKS_PER_MILLI) - MILLIS_TO_UNIX_EPOCH)
}

fn currency_or_default(currency_code: &Option<String>) -> String {
    currency_code
        .as_deref()
        .filter(|code| !code.is_empty())
        .unwrap_or(DEFAULT_CURRENCY_CODE)
        .to_string()
}

pub(crate) fn to_product(product: &StoreProduct) -> Product {
    let price = &product.price;
    let localized_price = if price.formatted_recurrence_price.is_empty() {
        price.formatted_price.clone()
    } else {
        price.formatted_recurrence_price.clone()
    };
    let micros_price = price_to_micros(parse_price(&localized_price));

    Product {
        product_id: product.store_id.clone(),
        name: product.title.clone(),
        description: product.description.clone(),
        localized_price,
        currency_code: currency_or_default(&price.currency_code),
        micros_price,
        windows_extras: Some(WindowsExtras {
            formatted_base_price: price.formatted_base_price.clone(),
            formatted_recurrence_price: price.formatted_recurrence_price.clone(),
            extended_json_data: product.extended_json_data.clone(),
            has_digital_download: product.has_digital_download,
            in_app_offer_token: product.in_app_offer_token.clone(),
            is_in_user_collection: product.is_in_user_collection,
            language: product.language.clone(),
            link_uri: product.link_uri.clone(),
            is_on_sale: price.is_on_sale,
            sale_end_date: price.sale_end_date,
            tag: String::new(),
            is_consumable: product.product_kind == CONSUMABLE,
            is_unmanaged_consumable: product.product_kind == UNMANAGED_CONSUMABLE,
            is_durable: product.product_kind == DURABLE,
            is_subscription: product.skus.iter().any(|sku| sku.is_subscription),
            subscription_info: subscription_info(&product.skus),
            keywords: product.keywords.clone(),
        }),
    }
}

fn subscription_info(skus: &[StoreSku]) -> Option<WindowsSubscriptionInfo> {
    let skus: Vec<WindowsSkuInfo> = skus
        .iter()
        .filter(|sku| sku.is_subscription)
        .map(to_sku_info)
        .collect();

    if skus.is_empty() {
        return None;
    }

    let has_trial_options = skus.iter().any(|sku| {
        sku.is_trial
            || sku
                .subscription_info
                .as_ref()
                .is_some_and(|info| info.has_trial_period)
    });
    let default_sku = skus
        .iter()
        .find(|sku| !sku.is_trial)
        .or_else(|| skus.first())
        .cloned();

    Some(WindowsSubscriptionInfo {
        skus,
        has_trial_options,
        default_sku,
    })
}

fn to_sku_info(sku: &StoreSku) -> WindowsSkuInfo {
    WindowsSkuInfo {
        store_id: sku.store_id.clone(),
        title: sku.title.clone(),
        description: sku.description.clone(),
        price: to_price_info(&sku.price),
        is_subscription: sku.is_subscription,
        is_trial: sku.is_trial,
        language: sku.language.clone(),
        custom_developer_data: sku.custom_developer_data.clone(),
        extended_json_data: sku.extended_json_data.clone(),
        subscription_info: sku
            .subscription_info
            .as_ref()
            .map(|info| WindowsStoreSubscriptionInfo {
                billing_period: info.billing_period,
                billing_period_unit: info.billing_period_unit,
                has_trial_period: info.has_trial_period,
                trial_period: info.trial_period,
                trial_period_unit: info.trial_period_unit,
            }),
        availabilities: sku.availabilities.iter().map(to_availability).collect(),
    }
}

fn to_availability(availability: &StoreAvailability) -> WindowsAvailabilityInfo {
    WindowsAvailabilityInfo {
        store_id: availability.store_id.clone(),
        end_date: availability.end_date,
        price: to_price_info(&availability.price),
    }
}

fn to_price_info(price: &StorePrice) -> WindowsPriceInfo {
    WindowsPriceInfo {
        formatted_price: price.formatted_price.clone(),
        formatted_base_price: price.formatted_base_price.clone(),
        formatted_recurrence_price: price.formatted_recurrence_price.clone(),
        unformatted_price: parse_price(&price.formatted_price),
        unformatted_base_price: parse_price(&price.formatted_base_price),
        unformatted_recurrence_price: parse_price(&price.formatted_recurrence_price),
        currency_code: currency_or_default(&price.currency_code),
        is_on_sale: price.is_on_sale,
        sale_end_date: price.sale_end_date,
    }
}

/// Maps an add-on license as reported by the app license query.
pub(crate) fn license_to_purchase(license: &StoreLicense) -> Purchase {
    Purchase {
        id: String::new(),
        product_id: license.sku_store_id.clone(),
        state: if license.is_active {
            PurchaseState::Purchased
        } else {
            PurchaseState::Unknown
        },
        purchase_token: String::new(),
        transaction_date: 0,
        expiration_date: license.expiration_date,
        original_json: license.extended_json_data.clone(),
    }
}

/// Maps the license backing an active subscription. The store keeps no
/// original purchase date, so the lookup time stands in for it.
pub(crate) fn subscription_license_to_purchase(
    license: &StoreLicense,
    product_id: &str,
    now: i64,
) -> Purchase {
    Purchase {
        id: license.in_app_offer_token.clone(),
        product_id: product_id.to_string(),
        state: PurchaseState::Purchased,
        purchase_token: String::new(),
        transaction_date: now,
        expiration_date: license.expiration_date,
        original_json: license.extended_json_data.clone(),
    }
}
