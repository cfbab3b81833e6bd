use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use crate::convert::{license_to_purchase, subscription_license_to_purchase, to_product};
use crate::error::{Error, PurchaseError};
use crate::models::*;
use crate::store::{StoreClient, StoreLicense, DURABLE};
use crate::translate::{
    consumable_outcome, is_license_active, matches_product_family, product_filter,
    purchase_outcome,
};

fn unix_millis_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}

/// Access to the in-app billing APIs on top of a platform store client.
pub struct InAppBilling<S> {
    store: S,
    clock: fn() -> i64,
}

impl<S: StoreClient> InAppBilling<S> {
    pub fn new(store: S) -> Self {
        InAppBilling {
            store,
            clock: unix_millis_now,
        }
    }

    #[cfg(test)]
    fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Looks up products of `item_type`. An extended error reported alongside
    /// the results is logged; whatever products came back are still returned.
    pub async fn get_product_info(
        &self,
        item_type: ItemType,
        product_ids: &[String],
    ) -> crate::Result<Vec<Product>> {
        let result = self
            .store
            .query_products(&product_filter(item_type), product_ids)
            .await?;

        if let Some(error) = &result.extended_error {
            log::warn!("product query reported an extended error: {error}");
        }

        Ok(result.products.iter().map(to_product).collect())
    }

    /// Active add-on licenses as purchases. Licenses carry no item type, so
    /// `_item_type` does not narrow the result.
    pub async fn get_purchases(&self, _item_type: ItemType) -> crate::Result<Vec<Purchase>> {
        let license = self.store.app_license().await?;

        Ok(license
            .add_on_licenses
            .iter()
            .filter(|license| license.is_active)
            .map(license_to_purchase)
            .collect())
    }

    pub async fn purchase(
        &self,
        product_id: &str,
        item_type: ItemType,
        options: &PurchaseOptions,
    ) -> crate::Result<Purchase> {
        if options.sub_offer_token.is_some() {
            log::debug!("offer tokens are not used by this store, purchasing {product_id} as is");
        }

        if item_type == ItemType::Subscription {
            self.purchase_subscription(product_id).await
        } else {
            let result = self.store.request_purchase(product_id).await?;
            purchase_outcome(result, product_id, (self.clock)())
        }
    }

    async fn purchase_subscription(&self, product_id: &str) -> crate::Result<Purchase> {
        if self.has_active_subscription(product_id).await {
            return Err(Error::purchase(
                PurchaseError::AlreadyOwned,
                "User already has an active subscription",
            ));
        }

        let query = self
            .store
            .query_products(&[DURABLE], &[product_id.to_string()])
            .await?;
        if let Some(error) = &query.extended_error {
            log::warn!("subscription lookup for {product_id} failed: {error}");
        }
        if query.extended_error.is_some() || query.find(product_id).is_none() {
            return Err(Error::purchase(
                PurchaseError::ProductRequestFailed,
                format!("Subscription product {product_id} not found"),
            ));
        }

        let result = self.store.request_purchase(product_id).await?;
        purchase_outcome(result, product_id, (self.clock)())
    }

    /// Reports `quantity` units of a consumable as fulfilled.
    ///
    /// The store tracks consumables by product, so `_transaction_identifier`
    /// is not sent.
    pub async fn consume_purchase(
        &self,
        product_id: &str,
        _transaction_identifier: &str,
        quantity: u32,
    ) -> crate::Result<bool> {
        let tracking_id = Uuid::new_v4();
        log::debug!("reporting {quantity} x {product_id} fulfilled, tracking id {tracking_id}");

        let result = self
            .store
            .report_consumable_fulfillment(product_id, quantity, tracking_id)
            .await?;
        consumable_outcome(result)
    }

    /// The store acknowledges purchases itself.
    pub async fn acknowledge_purchase(&self, _purchase_token: &str) -> crate::Result<bool> {
        Ok(true)
    }

    /// Marks transactions as finished. The store closes them on its own, so
    /// every id is reported as finalized.
    pub async fn finalize_purchase(
        &self,
        transaction_identifiers: &[String],
    ) -> crate::Result<Vec<FinalizedTransaction>> {
        Ok(transaction_identifiers
            .iter()
            .map(|id| FinalizedTransaction {
                id: id.clone(),
                success: true,
            })
            .collect())
    }

    pub async fn upgrade_purchased_subscription(
        &self,
        _new_product_id: &str,
        _purchase_token_of_original_subscription: &str,
        _proration_mode: SubscriptionProrationMode,
    ) -> crate::Result<Purchase> {
        Err(Error::NotSupported(
            "upgrade_purchased_subscription".to_string(),
        ))
    }

    /// Whether the user holds an active, unexpired license for the
    /// subscription family `product_id`.
    ///
    /// Best effort: a failing store lookup is logged and reads as `false`.
    pub async fn has_active_subscription(&self, product_id: &str) -> bool {
        match self.active_subscription_license(product_id).await {
            Ok(license) => license.is_some(),
            Err(e) => {
                log::warn!("failed to check subscription status for {product_id}: {e}");
                false
            }
        }
    }

    /// The purchase backing an active subscription, if any. Best effort like
    /// [`Self::has_active_subscription`].
    pub async fn active_subscription(&self, product_id: &str) -> Option<Purchase> {
        match self.active_subscription_license(product_id).await {
            Ok(license) => license.map(|license| {
                subscription_license_to_purchase(&license, product_id, (self.clock)())
            }),
            Err(e) => {
                log::warn!("failed to look up existing subscription {product_id}: {e}");
                None
            }
        }
    }

    async fn active_subscription_license(
        &self,
        product_id: &str,
    ) -> crate::Result<Option<StoreLicense>> {
        let app_license = self.store.app_license().await?;
        let now = (self.clock)();

        Ok(app_license.add_on_licenses.into_iter().find(|license| {
            license.is_active
                && matches_product_family(&license.sku_store_id, product_id)
                && is_license_active(license.expiration_date, now)
        }))
    }
}
