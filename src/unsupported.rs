use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tauri::{plugin::PluginApi, AppHandle, Runtime};
use uuid::Uuid;

use crate::billing::InAppBilling;
use crate::config::Config;
use crate::store::*;

pub fn init<R: Runtime, C: DeserializeOwned>(
    _app: &AppHandle<R>,
    _api: PluginApi<R, C>,
    _config: Config,
) -> crate::Result<InAppBilling<UnsupportedStore<R>>> {
    log::debug!("in-app billing has no store backend on this platform");
    Ok(InAppBilling::new(UnsupportedStore(PhantomData)))
}

/// Store client for platforms without a backend. Every request fails.
pub struct UnsupportedStore<R: Runtime>(PhantomData<fn() -> R>);

fn not_supported(operation: &str) -> crate::Error {
    crate::Error::NotSupported(operation.to_string())
}

#[async_trait]
impl<R: Runtime> StoreClient for UnsupportedStore<R> {
    async fn query_products(
        &self,
        _product_kinds: &[&str],
        _store_ids: &[String],
    ) -> crate::Result<ProductQueryResult> {
        Err(not_supported("query_products"))
    }

    async fn request_purchase(&self, _store_id: &str) -> crate::Result<PurchaseResult> {
        Err(not_supported("request_purchase"))
    }

    async fn report_consumable_fulfillment(
        &self,
        _product_id: &str,
        _quantity: u32,
        _tracking_id: Uuid,
    ) -> crate::Result<ConsumableResult> {
        Err(not_supported("report_consumable_fulfillment"))
    }

    async fn app_license(&self) -> crate::Result<AppLicense> {
        Err(not_supported("app_license"))
    }
}
