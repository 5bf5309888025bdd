use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;

/// One line of historical purchase data, grouped by invoice for
/// co-purchase mining.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub invoice_id: String,
    pub product_id: ProductId,
}
