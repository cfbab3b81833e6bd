use tauri::{command, AppHandle, Emitter, Runtime};

use crate::models::*;
use crate::{InAppBillingExt, Result};

#[command]
pub(crate) async fn get_product_info<R: Runtime>(
    app: AppHandle<R>,
    payload: GetProductInfoRequest,
) -> Result<GetProductInfoResponse> {
    let products = app
        .in_app_billing()
        .get_product_info(payload.item_type, &payload.product_ids)
        .await?;
    Ok(GetProductInfoResponse { products })
}

#[command]
pub(crate) async fn get_purchases<R: Runtime>(
    app: AppHandle<R>,
    payload: GetPurchasesRequest,
) -> Result<GetPurchasesResponse> {
    let purchases = app.in_app_billing().get_purchases(payload.item_type).await?;
    Ok(GetPurchasesResponse { purchases })
}

#[command]
pub(crate) async fn purchase<R: Runtime>(
    app: AppHandle<R>,
    payload: PurchaseRequest,
) -> Result<Purchase> {
    let purchase = app
        .in_app_billing()
        .purchase(&payload.product_id, payload.item_type, &payload.options)
        .await?;

    if let Err(e) = app.emit("purchaseUpdated", &purchase) {
        log::warn!("failed to emit purchaseUpdated: {e}");
    }

    Ok(purchase)
}

#[command]
pub(crate) async fn consume_purchase<R: Runtime>(
    app: AppHandle<R>,
    payload: ConsumePurchaseRequest,
) -> Result<ConsumePurchaseResponse> {
    let success = app
        .in_app_billing()
        .consume_purchase(
            &payload.product_id,
            &payload.transaction_identifier,
            payload.quantity,
        )
        .await?;
    Ok(ConsumePurchaseResponse { success })
}

#[command]
pub(crate) async fn acknowledge_purchase<R: Runtime>(
    app: AppHandle<R>,
    payload: AcknowledgePurchaseRequest,
) -> Result<AcknowledgePurchaseResponse> {
    let success = app
        .in_app_billing()
        .acknowledge_purchase(&payload.purchase_token)
        .await?;
    Ok(AcknowledgePurchaseResponse { success })
}

#[command]
pub(crate) async fn finalize_purchase<R: Runtime>(
    app: AppHandle<R>,
    payload: FinalizePurchaseRequest,
) -> Result<FinalizePurchaseResponse> {
    let transactions = app
        .in_app_billing()
        .finalize_purchase(&payload.transaction_identifiers)
        .await?;
    Ok(FinalizePurchaseResponse { transactions })
}

#[command]
pub(crate) async fn upgrade_purchased_subscription<R: Runtime>(
    app: AppHandle<R>,
    payload: UpgradeSubscriptionRequest,
) -> Result<Purchase> {
    app.in_app_billing()
        .upgrade_purchased_subscription(
            &payload.new_product_id,
            &payload.purchase_token_of_original_subscription,
            payload.proration_mode,
        )
        .await
}

#[command]
pub(crate) async fn active_subscription<R: Runtime>(
    app: AppHandle<R>,
    payload: ActiveSubscriptionRequest,
) -> Result<ActiveSubscriptionResponse> {
    let purchase = app
        .in_app_billing()
        .active_subscription(&payload.product_id)
        .await;
    Ok(ActiveSubscriptionResponse { purchase })
}
