use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;

/// A promotional rule. Deals are evaluated highest `priority` first; ties keep
/// source order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub deal_name: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub priority: i64,
    #[serde(flatten)]
    pub kind: DealKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DealKind {
    /// Every `min_quantity_for_deal` qualifying units make
    /// `apply_to_n_lowest_price` of the cheapest units free.
    Bogo {
        #[serde(default)]
        applicable_product_ids: Vec<ProductId>,
        #[serde(default)]
        min_quantity_for_deal: u32,
        #[serde(default = "default_free_units_per_set")]
        apply_to_n_lowest_price: u32,
    },
    PercentageCategory {
        category_restriction: String,
        discount_percentage: Decimal,
        #[serde(default)]
        excluded_subcategories: Vec<String>,
    },
    FixedAmountItem {
        #[serde(default)]
        applicable_product_ids: Vec<ProductId>,
        discount_value: Decimal,
    },
    PercentageItem {
        #[serde(default)]
        applicable_product_ids: Vec<ProductId>,
        discount_percentage: Decimal,
    },
    /// A flat `discount_value` per complete bundle of
    /// `min_quantity_for_deal` units, shared across the bundle lines by value.
    BundleThreshold {
        #[serde(default)]
        applicable_product_ids: Vec<ProductId>,
        #[serde(default)]
        min_quantity_for_deal: u32,
        discount_value: Decimal,
    },
}

fn default_free_units_per_set() -> u32 {
    1
}

impl DealKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bogo { .. } => "BOGO",
            Self::PercentageCategory { .. } => "PERCENTAGE_CATEGORY",
            Self::FixedAmountItem { .. } => "FIXED_AMOUNT_ITEM",
            Self::PercentageItem { .. } => "PERCENTAGE_ITEM",
            Self::BundleThreshold { .. } => "BUNDLE_THRESHOLD",
        }
    }
}

/// Units per set for threshold-style deals; an absent or zero threshold
/// means every unit counts on its own.
pub fn set_size(min_quantity_for_deal: u32) -> u64 {
    u64::from(min_quantity_for_deal.max(1))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{set_size, Deal, DealKind};

    #[test]
    fn parses_each_deal_kind_from_wire_format() {
        let deals: Vec<Deal> = serde_json::from_str(
            r#"[
                {"deal_name":"Chips BOGO","type":"BOGO","active":true,"priority":10,
                 "applicable_product_ids":["P1","P2"],"min_quantity_for_deal":2,"apply_to_n_lowest_price":1},
                {"deal_name":"Snacks 10%","type":"PERCENTAGE_CATEGORY","active":true,
                 "category_restriction":"Snacks","discount_percentage":10},
                {"deal_name":"$1 off soap","type":"FIXED_AMOUNT_ITEM","active":false,
                 "applicable_product_ids":["P3"],"discount_value":1.00},
                {"deal_name":"Cola 15%","type":"PERCENTAGE_ITEM","active":true,
                 "applicable_product_ids":["P4"],"discount_percentage":"15"},
                {"deal_name":"Any 3 save $2","type":"BUNDLE_THRESHOLD","active":true,
                 "applicable_product_ids":["P1","P4"],"min_quantity_for_deal":3,"discount_value":2}
            ]"#,
        )
        .expect("deals should parse");

        let labels: Vec<&str> = deals.iter().map(|deal| deal.kind.label()).collect();
        assert_eq!(
            labels,
            vec!["BOGO", "PERCENTAGE_CATEGORY", "FIXED_AMOUNT_ITEM", "PERCENTAGE_ITEM", "BUNDLE_THRESHOLD"]
        );
        assert_eq!(deals[0].priority, 10);
        assert!(!deals[2].active);
        assert_eq!(deals[1].priority, 0);
        assert!(matches!(
            &deals[1].kind,
            DealKind::PercentageCategory { excluded_subcategories, discount_percentage, .. }
                if excluded_subcategories.is_empty() && *discount_percentage == Decimal::TEN
        ));
    }

    #[test]
    fn missing_threshold_counts_every_unit() {
        assert_eq!(set_size(0), 1);
        assert_eq!(set_size(3), 3);
    }
}
