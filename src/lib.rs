use tauri::{
    plugin::{Builder, TauriPlugin},
    Manager, Runtime,
};

pub use models::*;

#[cfg(not(target_os = "windows"))]
mod unsupported;
#[cfg(target_os = "windows")]
mod windows_store;

mod billing;
mod commands;
mod config;
mod convert;
mod error;
mod models;
pub mod store;
pub mod translate;

pub use billing::InAppBilling;
pub use config::Config;
pub use error::{Error, ErrorResponse, PurchaseError, Result};

#[cfg(not(target_os = "windows"))]
pub use unsupported::UnsupportedStore as PlatformStore;
#[cfg(target_os = "windows")]
pub use windows_store::WindowsStore as PlatformStore;

/// Extensions to [`tauri::App`], [`tauri::AppHandle`] and [`tauri::Window`] to access the in-app billing APIs.
pub trait InAppBillingExt<R: Runtime> {
    fn in_app_billing(&self) -> &InAppBilling<PlatformStore<R>>;
}

impl<R: Runtime, T: Manager<R>> crate::InAppBillingExt<R> for T {
    fn in_app_billing(&self) -> &InAppBilling<PlatformStore<R>> {
        self.state::<InAppBilling<PlatformStore<R>>>().inner()
    }
}

/// Initializes the plugin.
pub fn init<R: Runtime>() -> TauriPlugin<R, Option<Config>> {
    Builder::<R, Option<Config>>::new("in-app-billing")
        .invoke_handler(tauri::generate_handler![
            commands::get_product_info,
            commands::get_purchases,
            commands::purchase,
            commands::consume_purchase,
            commands::acknowledge_purchase,
            commands::finalize_purchase,
            commands::upgrade_purchased_subscription,
            commands::active_subscription,
        ])
        .setup(|app, api| {
            let config = api.config().clone().unwrap_or_default();
            #[cfg(target_os = "windows")]
            let billing = windows_store::init(app, api, config)?;
            #[cfg(not(target_os = "windows"))]
            let billing = unsupported::init(app, api, config)?;
            app.manage(billing);
            Ok(())
        })
        .build()
}
