use serde::{Deserialize, Serialize};
use shop_payment_engine::db_types::NewProduct;
use spg_common::Money;

/// The inbound shape for creating a catalog product. Validation happens in [`Self::into_new_product`] so that the
/// engine only ever sees well-formed products.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductForm {
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub stock: i64,
}

fn default_category() -> String {
    "general".to_string()
}

impl ProductForm {
    pub fn into_new_product(self) -> Result<NewProduct, String> {
        if self.name.trim().is_empty() {
            return Err("product name must not be empty".to_string());
        }
        if self.price.is_negative() {
            return Err("product price must not be negative".to_string());
        }
        if self.stock < 0 {
            return Err("product stock must not be negative".to_string());
        }
        Ok(NewProduct::new(self.name, self.price)
            .with_description(self.description)
            .with_category(self.category)
            .with_stock(self.stock))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonResponse {
    pub message: String,
}

impl JsonResponse {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self { message: message.into() }
    }
}
