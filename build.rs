const COMMANDS: &[&str] = &[
    "get_product_info",
    "get_purchases",
    "purchase",
    "consume_purchase",
    "acknowledge_purchase",
    "finalize_purchase",
    "upgrade_purchased_subscription",
    "active_subscription",
];

fn main() {
    tauri_plugin::Builder::new(COMMANDS).build();
}
