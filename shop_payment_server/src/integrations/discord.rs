use discord_tools::{DiscordApi, DiscordApiError, Embed};
use log::*;
use shop_payment_engine::{
    db_types::{PaymentTransaction, Product},
    traits::DeliveryNotifier,
};

const EMBED_GREEN: u32 = 0x00ff00;

/// [`DeliveryNotifier`] implementation that DMs the buyer on Discord, with a channel-broadcast fallback when the
/// buyer's privacy settings reject the DM.
///
/// Per the notifier contract this adapter never propagates an error: every messaging failure becomes a logged
/// diagnostic and a `false` result, leaving the transaction paid-but-undelivered for the operator report.
#[derive(Clone)]
pub struct DiscordNotifier {
    api: DiscordApi,
    fallback_channel: Option<String>,
}

impl DiscordNotifier {
    pub fn new(api: DiscordApi, fallback_channel: Option<String>) -> Self {
        Self { api, fallback_channel }
    }

    async fn deliver_via_dm(&self, buyer_id: &str, embed: &Embed) -> Result<bool, DiscordApiError> {
        let dm = match self.api.create_dm(buyer_id).await {
            Ok(dm) => dm,
            Err(DiscordApiError::Forbidden(message)) => {
                debug!("📨️ DM channel with buyer {buyer_id} refused: {message}");
                return Ok(false);
            },
            Err(e) => return Err(e),
        };
        match self.api.send_embed(&dm.id, None, embed).await {
            Ok(_) => {
                info!("📨️ Delivery DM sent to buyer {buyer_id}");
                Ok(true)
            },
            Err(DiscordApiError::Forbidden(message)) => {
                debug!("📨️ DM to buyer {buyer_id} rejected by privacy settings: {message}");
                Ok(false)
            },
            Err(e) => Err(e),
        }
    }

    async fn deliver_via_fallback(&self, buyer_id: &str, embed: &Embed) -> bool {
        let Some(channel) = &self.fallback_channel else {
            warn!("📨️ Buyer {buyer_id} has DMs closed and no fallback channel is configured");
            return false;
        };
        let mention = format!("<@{buyer_id}>");
        match self.api.send_embed(channel, Some(&mention), embed).await {
            Ok(_) => {
                info!("📨️ Delivery for buyer {buyer_id} announced in fallback channel {channel}");
                true
            },
            Err(e) => {
                warn!("📨️ Fallback channel delivery for buyer {buyer_id} failed: {e}");
                false
            },
        }
    }
}

impl DeliveryNotifier for DiscordNotifier {
    async fn deliver(&self, transaction: &PaymentTransaction, product: &Product) -> bool {
        let embed = purchase_embed(transaction, product);
        match self.deliver_via_dm(&transaction.buyer_id, &embed).await {
            Ok(true) => true,
            // The DM was rejected, not broken: announce in the fallback channel instead.
            Ok(false) => self.deliver_via_fallback(&transaction.buyer_id, &embed).await,
            Err(e) => {
                warn!("📨️ DM delivery for buyer {} failed: {e}", transaction.buyer_id);
                false
            },
        }
    }
}

/// The purchase confirmation message, with category-specific delivery instructions.
fn purchase_embed(transaction: &PaymentTransaction, product: &Product) -> Embed {
    let short_session: String = transaction.session_id.as_str().chars().take(8).collect();
    let delivery_note = if product.category == "streaming" {
        "Your access credentials have been sent by email. Remember to check your spam folder."
    } else {
        "Your order has been processed. Contact support if anything is missing."
    };
    let description = if product.description.is_empty() { "N/A" } else { product.description.as_str() };
    Embed::new("🎉 Purchase successful!")
        .with_description(format!("Thanks for buying **{}**!", product.name))
        .with_color(EMBED_GREEN)
        .add_field("Product", product.name.clone(), true)
        .add_field("Price", format!("{} {}", product.price, transaction.currency.to_uppercase()), true)
        .add_field("Description", description, false)
        .add_field("📦 Delivery", delivery_note, false)
        .with_footer(format!("Transaction: {short_session}…"))
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use chrono::Utc;
    use shop_payment_engine::db_types::{PaymentStatus, ProductId};
    use spg_common::Money;

    use super::*;

    fn sample(category: &str) -> (PaymentTransaction, Product) {
        let product = Product {
            id: ProductId::from("prod-1"),
            name: "Netflix Premium".to_string(),
            price: Money::from_cents(2599),
            description: "Premium account".to_string(),
            category: category.to_string(),
            stock: 5,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let transaction = PaymentTransaction {
            session_id: "cs_test_abcdef123".into(),
            product_id: product.id.clone(),
            buyer_id: "440011".to_string(),
            amount: Money::from_cents(2599),
            currency: "brl".to_string(),
            payment_status: PaymentStatus::Paid,
            gateway_status: "complete".to_string(),
            delivered: false,
            metadata: HashMap::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        (transaction, product)
    }

    #[test]
    fn embed_carries_product_price_and_trimmed_session() {
        let (transaction, product) = sample("streaming");
        let embed = purchase_embed(&transaction, &product);
        let json = serde_json::to_value(&embed).unwrap();
        assert_eq!(json["fields"][0]["value"], "Netflix Premium");
        assert_eq!(json["fields"][1]["value"], "25.99 BRL");
        assert_eq!(json["footer"]["text"], "Transaction: cs_test_…");
    }

    #[test]
    fn delivery_instructions_depend_on_category() {
        let (transaction, product) = sample("streaming");
        let embed = purchase_embed(&transaction, &product);
        let json = serde_json::to_value(&embed).unwrap();
        assert!(json["fields"][3]["value"].as_str().unwrap().contains("credentials"));

        let (transaction, product) = sample("general");
        let embed = purchase_embed(&transaction, &product);
        let json = serde_json::to_value(&embed).unwrap();
        assert!(json["fields"][3]["value"].as_str().unwrap().contains("processed"));
    }
}
