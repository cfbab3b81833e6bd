use std::sync::RwLock;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tauri::{plugin::PluginApi, AppHandle, Manager, Runtime};
use uuid::Uuid;
use windows::core::{Interface, GUID, HRESULT, HSTRING};
use windows::{
    Foundation::DateTime,
    Services::Store::{
        StoreConsumableStatus, StoreContext, StoreDurationUnit, StoreLicense as WinStoreLicense,
        StorePrice as WinStorePrice, StoreProduct as WinStoreProduct,
        StorePurchaseStatus, StoreSku as WinStoreSku,
    },
    Win32::UI::Shell::IInitializeWithWindow,
};
use windows_collections::IIterable;

use crate::billing::InAppBilling;
use crate::config::Config;
use crate::convert::ticks_to_unix_millis;
use crate::models::DurationUnit;
use crate::store::*;
use crate::Error;

pub fn init<R: Runtime, C: DeserializeOwned>(
    app: &AppHandle<R>,
    _api: PluginApi<R, C>,
    config: Config,
) -> crate::Result<InAppBilling<WindowsStore<R>>> {
    Ok(InAppBilling::new(WindowsStore {
        app_handle: app.clone(),
        window_label: config.window_label,
        context: RwLock::new(None),
    }))
}

impl From<windows::core::Error> for Error {
    fn from(error: windows::core::Error) -> Self {
        Error::Store(format!("{} ({:?})", error.message(), error.code()))
    }
}

/// Microsoft Store client bound to one app window.
pub struct WindowsStore<R: Runtime> {
    app_handle: AppHandle<R>,
    window_label: String,
    /// Created on first use: the store needs a window handle, and no window
    /// exists while the plugin is set up.
    context: RwLock<Option<StoreContext>>,
}

impl<R: Runtime> WindowsStore<R> {
    fn context(&self) -> crate::Result<StoreContext> {
        if let Some(context) = self
            .context
            .read()
            .map_err(|e| Error::Store(format!("store context lock poisoned: {e}")))?
            .as_ref()
        {
            return Ok(context.clone());
        }

        let mut guard = self
            .context
            .write()
            .map_err(|e| Error::Store(format!("store context lock poisoned: {e}")))?;
        if let Some(context) = guard.as_ref() {
            return Ok(context.clone());
        }

        let window = self
            .app_handle
            .get_webview_window(&self.window_label)
            .ok_or_else(|| Error::Window(format!("no window labelled '{}'", self.window_label)))?;
        let hwnd = window
            .hwnd()
            .map_err(|e| Error::Window(format!("failed to get window handle: {e}")))?;

        let context = StoreContext::GetDefault()?;
        // Store dialogs are parented to the app window
        let init = context.cast::<IInitializeWithWindow>()?;
        unsafe {
            init.Initialize(hwnd)?;
        }
        log::debug!("store context bound to window '{}'", self.window_label);

        *guard = Some(context.clone());
        Ok(context)
    }
}

fn extended_error_message(hresult: HRESULT) -> Option<String> {
    hresult.is_err().then(|| hresult.message())
}

fn optional_datetime(datetime: DateTime) -> Option<i64> {
    ticks_to_unix_millis(datetime.UniversalTime)
}

fn duration_unit(unit: StoreDurationUnit) -> DurationUnit {
    match unit {
        StoreDurationUnit::Minute => DurationUnit::Minute,
        StoreDurationUnit::Hour => DurationUnit::Hour,
        StoreDurationUnit::Day => DurationUnit::Day,
        StoreDurationUnit::Week => DurationUnit::Week,
        StoreDurationUnit::Month => DurationUnit::Month,
        StoreDurationUnit::Year => DurationUnit::Year,
        other => {
            log::debug!("unrecognized duration unit {}, reading it as months", other.0);
            DurationUnit::Month
        }
    }
}

fn purchase_status(status: StorePurchaseStatus) -> PurchaseStatus {
    match status {
        StorePurchaseStatus::Succeeded => PurchaseStatus::Succeeded,
        StorePurchaseStatus::AlreadyPurchased => PurchaseStatus::AlreadyPurchased,
        StorePurchaseStatus::NotPurchased => PurchaseStatus::NotPurchased,
        StorePurchaseStatus::NetworkError => PurchaseStatus::NetworkError,
        StorePurchaseStatus::ServerError => PurchaseStatus::ServerError,
        other => PurchaseStatus::Other(other.0),
    }
}

fn consumable_status(status: StoreConsumableStatus) -> ConsumableStatus {
    match status {
        StoreConsumableStatus::Succeeded => ConsumableStatus::Succeeded,
        StoreConsumableStatus::InsufficentQuantity => ConsumableStatus::InsufficientQuantity,
        StoreConsumableStatus::NetworkError => ConsumableStatus::NetworkError,
        StoreConsumableStatus::ServerError => ConsumableStatus::ServerError,
        other => ConsumableStatus::Other(other.0),
    }
}

fn read_price(price: &WinStorePrice) -> windows::core::Result<StorePrice> {
    let currency_code = price.CurrencyCode()?.to_string();
    Ok(StorePrice {
        formatted_price: price.FormattedPrice()?.to_string(),
        formatted_base_price: price.FormattedBasePrice()?.to_string(),
        formatted_recurrence_price: price.FormattedRecurrencePrice()?.to_string(),
        currency_code: (!currency_code.is_empty()).then_some(currency_code),
        is_on_sale: price.IsOnSale()?,
        sale_end_date: optional_datetime(price.SaleEndDate()?),
    })
}

fn read_sku(sku: &WinStoreSku) -> windows::core::Result<StoreSku> {
    let is_subscription = sku.IsSubscription()?;
    let subscription_info = if is_subscription {
        let info = sku.SubscriptionInfo()?;
        Some(StoreSubscriptionInfo {
            billing_period: info.BillingPeriod()?,
            billing_period_unit: duration_unit(info.BillingPeriodUnit()?),
            has_trial_period: info.HasTrialPeriod()?,
            trial_period: info.TrialPeriod()?,
            trial_period_unit: duration_unit(info.TrialPeriodUnit()?),
        })
    } else {
        None
    };

    let availabilities = sku.Availabilities()?;
    let mut available = Vec::with_capacity(availabilities.Size()? as usize);
    for i in 0..availabilities.Size()? {
        let availability = availabilities.GetAt(i)?;
        available.push(StoreAvailability {
            store_id: availability.StoreId()?.to_string(),
            end_date: optional_datetime(availability.EndDate()?),
            price: read_price(&availability.Price()?)?,
        });
    }

    Ok(StoreSku {
        store_id: sku.StoreId()?.to_string(),
        title: sku.Title()?.to_string(),
        description: sku.Description()?.to_string(),
        price: read_price(&sku.Price()?)?,
        is_subscription,
        is_trial: sku.IsTrial()?,
        language: sku.Language()?.to_string(),
        custom_developer_data: sku.CustomDeveloperData()?.to_string(),
        extended_json_data: sku.ExtendedJsonData()?.to_string(),
        subscription_info,
        availabilities: available,
    })
}

fn read_product(product: &WinStoreProduct) -> windows::core::Result<StoreProduct> {
    let keywords = product.Keywords()?;
    let mut keyword_list = Vec::with_capacity(keywords.Size()? as usize);
    for i in 0..keywords.Size()? {
        keyword_list.push(keywords.GetAt(i)?.to_string());
    }

    let skus = product.Skus()?;
    let mut sku_list = Vec::with_capacity(skus.Size()? as usize);
    for i in 0..skus.Size()? {
        sku_list.push(read_sku(&skus.GetAt(i)?)?);
    }

    Ok(StoreProduct {
        store_id: product.StoreId()?.to_string(),
        title: product.Title()?.to_string(),
        description: product.Description()?.to_string(),
        product_kind: product.ProductKind()?.to_string(),
        price: read_price(&product.Price()?)?,
        extended_json_data: product.ExtendedJsonData()?.to_string(),
        has_digital_download: product.HasDigitalDownload()?,
        in_app_offer_token: product.InAppOfferToken()?.to_string(),
        is_in_user_collection: product.IsInUserCollection()?,
        language: product.Language()?.to_string(),
        link_uri: product
            .LinkUri()
            .and_then(|uri| uri.AbsoluteUri())
            .ok()
            .map(|uri| uri.to_string()),
        keywords: keyword_list,
        skus: sku_list,
    })
}

fn read_license(license: &WinStoreLicense) -> windows::core::Result<StoreLicense> {
    Ok(StoreLicense {
        sku_store_id: license.SkuStoreId()?.to_string(),
        in_app_offer_token: license.InAppOfferToken()?.to_string(),
        is_active: license.IsActive()?,
        expiration_date: optional_datetime(license.ExpirationDate()?),
        extended_json_data: license.ExtendedJsonData()?.to_string(),
    })
}

#[async_trait]
impl<R: Runtime> StoreClient for WindowsStore<R> {
    async fn query_products(
        &self,
        product_kinds: &[&str],
        store_ids: &[String],
    ) -> crate::Result<ProductQueryResult> {
        let context = self.context()?;

        let kinds: IIterable<HSTRING> = product_kinds
            .iter()
            .map(|kind| HSTRING::from(*kind))
            .collect::<Vec<_>>()
            .into();
        let ids: IIterable<HSTRING> = store_ids
            .iter()
            .map(|id| HSTRING::from(id.as_str()))
            .collect::<Vec<_>>()
            .into();

        let result = context
            .GetStoreProductsAsync(&kinds, &ids)
            .and_then(|async_op| async_op.get())?;

        let mut products = Vec::new();
        let iterator = result.Products()?.First()?;
        while iterator.HasCurrent()? {
            products.push(read_product(&iterator.Current()?.Value()?)?);
            iterator.MoveNext()?;
        }

        Ok(ProductQueryResult {
            products,
            extended_error: extended_error_message(result.ExtendedError()?),
        })
    }

    async fn request_purchase(&self, store_id: &str) -> crate::Result<PurchaseResult> {
        let context = self.context()?;

        let result = context
            .RequestPurchaseAsync(&HSTRING::from(store_id))
            .and_then(|async_op| async_op.get())?;

        Ok(PurchaseResult {
            status: purchase_status(result.Status()?),
            extended_error: extended_error_message(result.ExtendedError()?),
        })
    }

    async fn report_consumable_fulfillment(
        &self,
        product_id: &str,
        quantity: u32,
        tracking_id: Uuid,
    ) -> crate::Result<ConsumableResult> {
        let context = self.context()?;

        let result = context
            .ReportConsumableFulfillmentAsync(
                &HSTRING::from(product_id),
                quantity,
                GUID::from_u128(tracking_id.as_u128()),
            )
            .and_then(|async_op| async_op.get())?;

        Ok(ConsumableResult {
            status: consumable_status(result.Status()?),
            extended_error: extended_error_message(result.ExtendedError()?),
        })
    }

    async fn app_license(&self) -> crate::Result<AppLicense> {
        let context = self.context()?;

        let license = context
            .GetAppLicenseAsync()
            .and_then(|async_op| async_op.get())?;

        let mut add_on_licenses = Vec::new();
        let iterator = license.AddOnLicenses()?.First()?;
        while iterator.HasCurrent()? {
            add_on_licenses.push(read_license(&iterator.Current()?.Value()?)?);
            iterator.MoveNext()?;
        }

        Ok(AppLicense { add_on_licenses })
    }
}
