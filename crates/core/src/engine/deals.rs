//! Deal pricing.
//!
//! Active deals run highest priority first (ties keep source order) and each
//! one sees the prices left by the deals before it. A contribution never
//! takes a line below zero; every recorded contribution appears once in
//! `applied_deals` and they sum to `total_discount`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::domain::deal::{set_size, Deal, DealKind};
use crate::domain::list::ListItem;
use crate::domain::product::{Product, ProductId};

const UNKNOWN_FIELD: &str = "N/A";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub product_name: String,
    pub category: String,
    pub subcategory: String,
    pub brand: String,
    pub original_price: Decimal,
    pub final_price_per_unit: Decimal,
    pub applied_discount_per_unit: Decimal,
    pub line_total: Decimal,
    pub applied_deals: Vec<String>,
}

/// One deal's contribution. `product_id` is set for per-line deals and
/// absent for deals that span several lines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedDeal {
    pub deal_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealOutcome {
    pub processed_items: Vec<PricedLine>,
    pub total_before_discount: Decimal,
    pub total_discount: Decimal,
    pub total_after_discount: Decimal,
    pub applied_deals_summary: Vec<String>,
    pub applied_deals: Vec<AppliedDeal>,
}

pub trait DealEngine: Send + Sync {
    fn price(&self, catalog: &Catalog, lines: &[ListItem]) -> DealOutcome;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PriorityDealEngine;

impl DealEngine for PriorityDealEngine {
    fn price(&self, catalog: &Catalog, lines: &[ListItem]) -> DealOutcome {
        apply_deals(catalog, lines)
    }
}

/// Rounds to cents with banker's rounding and a fixed two-digit scale.
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp(2);
    rounded.rescale(2);
    rounded
}

struct WorkingLine<'a> {
    product_id: &'a ProductId,
    quantity: u32,
    product: Option<&'a Product>,
    original_price: Decimal,
    final_price_per_unit: Decimal,
    applied_discount_per_unit: Decimal,
    applied_deals: Vec<String>,
}

impl<'a> WorkingLine<'a> {
    fn new(item: &'a ListItem, product: Option<&'a Product>) -> Self {
        let original_price = product.map(|product| product.price).unwrap_or(Decimal::ZERO);
        Self {
            product_id: &item.product_id,
            quantity: item.quantity,
            product,
            original_price,
            final_price_per_unit: original_price,
            applied_discount_per_unit: Decimal::ZERO,
            applied_deals: Vec::new(),
        }
    }

    fn name(&self) -> String {
        match self.product {
            Some(product) => product.name.clone(),
            None => format!("Unknown Product (ID: {})", self.product_id),
        }
    }

    fn original_value(&self) -> Decimal {
        self.original_price * Decimal::from(self.quantity)
    }

    /// Takes up to `requested` off the line and returns what was taken.
    fn discount(&mut self, deal_name: &str, requested: Decimal) -> Decimal {
        if self.quantity == 0 || requested <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let quantity = Decimal::from(self.quantity);
        let remaining = (self.final_price_per_unit * quantity).max(Decimal::ZERO);
        if remaining.is_zero() {
            return Decimal::ZERO;
        }

        let amount = if requested >= remaining {
            self.applied_discount_per_unit += self.final_price_per_unit;
            self.final_price_per_unit = Decimal::ZERO;
            remaining
        } else {
            let per_unit = requested / quantity;
            self.applied_discount_per_unit += per_unit;
            self.final_price_per_unit -= per_unit;
            requested
        };

        self.applied_deals.push(deal_name.to_string());
        amount
    }

    fn into_priced(self) -> PricedLine {
        let name = self.name();
        let (category, subcategory, brand) = match self.product {
            Some(product) => {
                (product.category.clone(), product.subcategory.clone(), product.brand.clone())
            }
            None => (
                UNKNOWN_FIELD.to_string(),
                UNKNOWN_FIELD.to_string(),
                UNKNOWN_FIELD.to_string(),
            ),
        };
        let final_price_per_unit = self.final_price_per_unit.max(Decimal::ZERO);

        PricedLine {
            product_id: self.product_id.clone(),
            quantity: self.quantity,
            product_name: name,
            category,
            subcategory,
            brand,
            original_price: round_money(self.original_price),
            final_price_per_unit: round_money(final_price_per_unit),
            applied_discount_per_unit: round_money(self.applied_discount_per_unit),
            line_total: round_money(final_price_per_unit * Decimal::from(self.quantity)),
            applied_deals: self.applied_deals,
        }
    }
}

#[derive(Default)]
struct Ledger {
    total: Decimal,
    summary: Vec<String>,
    entries: Vec<AppliedDeal>,
}

impl Ledger {
    fn record_line(&mut self, deal: &Deal, line: &WorkingLine<'_>, amount: Decimal) {
        if amount.is_zero() {
            return;
        }
        self.total += amount;
        self.summary.push(format!(
            "{} applied to {} (-${})",
            deal.deal_name,
            line.name(),
            round_money(amount)
        ));
        self.entries.push(AppliedDeal {
            deal_name: deal.deal_name.clone(),
            product_id: Some(line.product_id.clone()),
            amount: round_money(amount),
        });
    }

    fn record_deal(&mut self, deal: &Deal, amount: Decimal) {
        if amount.is_zero() {
            return;
        }
        self.total += amount;
        self.summary.push(format!("{} applied (-${})", deal.deal_name, round_money(amount)));
        self.entries.push(AppliedDeal {
            deal_name: deal.deal_name.clone(),
            product_id: None,
            amount: round_money(amount),
        });
    }
}

pub fn apply_deals(catalog: &Catalog, items: &[ListItem]) -> DealOutcome {
    let mut lines: Vec<WorkingLine<'_>> = items
        .iter()
        .map(|item| {
            let product = catalog.product(&item.product_id);
            if product.is_none() {
                warn!(
                    event_name = "deals.unknown_product",
                    product_id = %item.product_id,
                    "pricing unknown product at zero"
                );
            }
            WorkingLine::new(item, product)
        })
        .collect();

    let total_before_discount: Decimal = lines.iter().map(WorkingLine::original_value).sum();

    let mut deals: Vec<&Deal> = catalog.deals().iter().filter(|deal| deal.active).collect();
    deals.sort_by(|a, b| b.priority.cmp(&a.priority));

    let mut ledger = Ledger::default();
    for deal in deals {
        let before = ledger.total;
        apply_deal(deal, &mut lines, &mut ledger);
        if ledger.total > before {
            debug!(
                event_name = "deals.applied",
                deal_name = %deal.deal_name,
                deal_type = deal.kind.label(),
                amount = %round_money(ledger.total - before),
                "deal applied"
            );
        }
    }

    let total_discount = ledger.total;
    let total_after_discount = total_before_discount - total_discount;

    DealOutcome {
        processed_items: lines.into_iter().map(WorkingLine::into_priced).collect(),
        total_before_discount: round_money(total_before_discount),
        total_discount: round_money(total_discount),
        total_after_discount: round_money(total_after_discount),
        applied_deals_summary: ledger.summary,
        applied_deals: ledger.entries,
    }
}

fn apply_deal(deal: &Deal, lines: &mut [WorkingLine<'_>], ledger: &mut Ledger) {
    match &deal.kind {
        DealKind::Bogo {
            applicable_product_ids,
            min_quantity_for_deal,
            apply_to_n_lowest_price,
        } => {
            apply_bogo(
                deal,
                lines,
                ledger,
                applicable_product_ids,
                *min_quantity_for_deal,
                *apply_to_n_lowest_price,
            );
        }
        DealKind::PercentageCategory {
            category_restriction,
            discount_percentage,
            excluded_subcategories,
        } => {
            for line in lines.iter_mut() {
                let Some(product) = line.product else { continue };
                if product.category != *category_restriction
                    || excluded_subcategories.contains(&product.subcategory)
                {
                    continue;
                }
                let per_unit = percent_of(line.original_price, *discount_percentage);
                let requested = per_unit * Decimal::from(line.quantity);
                let amount = line.discount(&deal.deal_name, requested);
                ledger.record_line(deal, line, amount);
            }
        }
        DealKind::FixedAmountItem { applicable_product_ids, discount_value } => {
            for line in lines.iter_mut() {
                if !applicable_product_ids.contains(line.product_id) {
                    continue;
                }
                let requested = *discount_value * Decimal::from(line.quantity);
                let amount = line.discount(&deal.deal_name, requested);
                ledger.record_line(deal, line, amount);
            }
        }
        DealKind::PercentageItem { applicable_product_ids, discount_percentage } => {
            for line in lines.iter_mut() {
                if !applicable_product_ids.contains(line.product_id) {
                    continue;
                }
                let per_unit = percent_of(line.original_price, *discount_percentage);
                let requested = per_unit * Decimal::from(line.quantity);
                let amount = line.discount(&deal.deal_name, requested);
                ledger.record_line(deal, line, amount);
            }
        }
        DealKind::BundleThreshold {
            applicable_product_ids,
            min_quantity_for_deal,
            discount_value,
        } => {
            apply_bundle(
                deal,
                lines,
                ledger,
                applicable_product_ids,
                *min_quantity_for_deal,
                *discount_value,
            );
        }
    }
}

fn percent_of(price: Decimal, percentage: Decimal) -> Decimal {
    price * percentage / Decimal::ONE_HUNDRED
}

/// Cheapest qualifying units go free first. Lines are visited in ascending
/// original price (stable), so each line gives up as many units as remain.
fn apply_bogo(
    deal: &Deal,
    lines: &mut [WorkingLine<'_>],
    ledger: &mut Ledger,
    applicable: &[ProductId],
    min_quantity: u32,
    free_per_set: u32,
) {
    let mut qualifying: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.quantity > 0 && applicable.contains(line.product_id))
        .map(|(index, _)| index)
        .collect();
    qualifying.sort_by(|a, b| lines[*a].original_price.cmp(&lines[*b].original_price));

    let units: u64 = qualifying.iter().map(|index| u64::from(lines[*index].quantity)).sum();
    let sets = units / set_size(min_quantity);
    let mut free_units = sets * u64::from(free_per_set);
    if free_units == 0 {
        return;
    }

    let mut total = Decimal::ZERO;
    for index in qualifying {
        if free_units == 0 {
            break;
        }
        let line = &mut lines[index];
        let taken = free_units.min(u64::from(line.quantity));
        free_units -= taken;
        let requested = line.original_price * Decimal::from(taken);
        total += line.discount(&deal.deal_name, requested);
    }

    ledger.record_deal(deal, total);
}

/// One `discount_value` per complete bundle, shared by original line value.
fn apply_bundle(
    deal: &Deal,
    lines: &mut [WorkingLine<'_>],
    ledger: &mut Ledger,
    applicable: &[ProductId],
    min_quantity: u32,
    discount_value: Decimal,
) {
    let in_bundle = |line: &WorkingLine<'_>| applicable.contains(line.product_id);

    let count: u64 =
        lines.iter().filter(|line| in_bundle(line)).map(|line| u64::from(line.quantity)).sum();
    let bundles = count / set_size(min_quantity);
    if bundles == 0 {
        return;
    }

    let bundle_discount = Decimal::from(bundles) * discount_value;
    let total_value: Decimal =
        lines.iter().filter(|line| in_bundle(line)).map(WorkingLine::original_value).sum();
    if total_value <= Decimal::ZERO {
        debug!(
            event_name = "deals.bundle_without_value",
            deal_name = %deal.deal_name,
            "bundle qualifies but carries no value to discount"
        );
        return;
    }

    let mut total = Decimal::ZERO;
    for line in lines.iter_mut().filter(|line| in_bundle(line)) {
        let share = bundle_discount * line.original_value() / total_value;
        total += line.discount(&deal.deal_name, share);
    }

    ledger.record_deal(deal, total);
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::{apply_deals, round_money, DealEngine, DealOutcome, PriorityDealEngine};
    use crate::catalog::Catalog;
    use crate::domain::deal::{Deal, DealKind};
    use crate::domain::list::ListItem;
    use crate::domain::product::{Product, ProductId};

    fn money(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    fn product(id: &str, cents: i64, category: &str, subcategory: &str) -> Product {
        Product {
            product_id: ProductId::from(id),
            name: format!("{id} item"),
            category: category.to_string(),
            subcategory: subcategory.to_string(),
            brand: "House".to_string(),
            price: money(cents),
        }
    }

    fn deal(name: &str, priority: i64, kind: DealKind) -> Deal {
        Deal { deal_name: name.to_string(), active: true, priority, kind }
    }

    fn ids(values: &[&str]) -> Vec<ProductId> {
        values.iter().map(|value| ProductId::from(*value)).collect()
    }

    fn catalog(products: Vec<Product>, deals: Vec<Deal>) -> Catalog {
        Catalog::builder().products(products).deals(deals).build()
    }

    #[test]
    fn bogo_frees_the_cheapest_units() {
        let catalog = catalog(
            vec![
                product("A", 500, "Snacks", ""),
                product("B", 300, "Snacks", ""),
                product("C", 700, "Snacks", ""),
                product("D", 200, "Snacks", ""),
            ],
            vec![deal(
                "Snack BOGO",
                1,
                DealKind::Bogo {
                    applicable_product_ids: ids(&["A", "B", "C", "D"]),
                    min_quantity_for_deal: 2,
                    apply_to_n_lowest_price: 1,
                },
            )],
        );
        let items: Vec<ListItem> =
            ["A", "B", "C", "D"].iter().map(|id| ListItem::new(*id, 1)).collect();

        let outcome = apply_deals(&catalog, &items);

        assert_eq!(outcome.total_before_discount, money(1700));
        assert_eq!(outcome.total_discount, money(500));
        assert_eq!(outcome.total_after_discount, money(1200));
        let finals: Vec<Decimal> =
            outcome.processed_items.iter().map(|line| line.final_price_per_unit).collect();
        assert_eq!(finals, vec![money(500), money(0), money(700), money(0)]);
        assert_eq!(outcome.applied_deals_summary, vec!["Snack BOGO applied (-$5.00)".to_string()]);
        assert_eq!(outcome.applied_deals[0].product_id, None);
    }

    #[test]
    fn bogo_spreads_free_units_across_a_multi_unit_line() {
        let catalog = catalog(
            vec![product("A", 400, "Snacks", "")],
            vec![deal(
                "Buy 3 get 1",
                1,
                DealKind::Bogo {
                    applicable_product_ids: ids(&["A"]),
                    min_quantity_for_deal: 3,
                    apply_to_n_lowest_price: 1,
                },
            )],
        );

        let outcome = apply_deals(&catalog, &[ListItem::new("A", 4)]);

        assert_eq!(outcome.total_discount, money(400));
        assert_eq!(outcome.processed_items[0].applied_discount_per_unit, money(100));
        assert_eq!(outcome.processed_items[0].line_total, money(1200));
    }

    #[test]
    fn category_percentage_discounts_every_unit() {
        let catalog = catalog(
            vec![product("CHIPS", 500, "Snacks", "Chips")],
            vec![deal(
                "Snacks 10%",
                1,
                DealKind::PercentageCategory {
                    category_restriction: "Snacks".to_string(),
                    discount_percentage: Decimal::TEN,
                    excluded_subcategories: Vec::new(),
                },
            )],
        );

        let outcome = apply_deals(&catalog, &[ListItem::new("CHIPS", 2)]);

        assert_eq!(outcome.total_discount, money(100));
        assert_eq!(outcome.processed_items[0].applied_discount_per_unit, money(50));
        assert_eq!(
            outcome.applied_deals_summary,
            vec!["Snacks 10% applied to CHIPS item (-$1.00)".to_string()]
        );
        assert_eq!(outcome.applied_deals[0].product_id, Some(ProductId::from("CHIPS")));
    }

    #[test]
    fn category_percentage_honours_excluded_subcategories() {
        let catalog = catalog(
            vec![product("CHIPS", 500, "Snacks", "Chips"), product("NUTS", 800, "Snacks", "Nuts")],
            vec![deal(
                "Snacks 10%",
                1,
                DealKind::PercentageCategory {
                    category_restriction: "Snacks".to_string(),
                    discount_percentage: Decimal::TEN,
                    excluded_subcategories: vec!["Nuts".to_string()],
                },
            )],
        );

        let outcome =
            apply_deals(&catalog, &[ListItem::new("CHIPS", 1), ListItem::new("NUTS", 1)]);

        assert_eq!(outcome.total_discount, money(50));
        assert!(outcome.processed_items[1].applied_deals.is_empty());
    }

    #[test]
    fn deals_stack_in_priority_order_and_never_go_negative() {
        let catalog = catalog(
            vec![product("SOAP", 500, "Household", "")],
            vec![
                deal(
                    "$4 off soap",
                    1,
                    DealKind::FixedAmountItem {
                        applicable_product_ids: ids(&["SOAP"]),
                        discount_value: money(400),
                    },
                ),
                deal(
                    "Half price soap",
                    10,
                    DealKind::PercentageItem {
                        applicable_product_ids: ids(&["SOAP"]),
                        discount_percentage: Decimal::from(50),
                    },
                ),
            ],
        );

        let outcome = apply_deals(&catalog, &[ListItem::new("SOAP", 2)]);

        assert_eq!(
            outcome.applied_deals_summary,
            vec![
                "Half price soap applied to SOAP item (-$5.00)".to_string(),
                "$4 off soap applied to SOAP item (-$5.00)".to_string(),
            ]
        );
        assert_eq!(outcome.total_discount, money(1000));
        assert_eq!(outcome.total_after_discount, money(0));
        assert_eq!(outcome.processed_items[0].final_price_per_unit, money(0));
        assert_eq!(outcome.processed_items[0].applied_discount_per_unit, money(500));
    }

    #[test]
    fn equal_priority_deals_keep_source_order() {
        let four_off = deal(
            "$4 off soap",
            5,
            DealKind::FixedAmountItem {
                applicable_product_ids: ids(&["SOAP"]),
                discount_value: money(400),
            },
        );
        let half_off = deal(
            "Half price soap",
            5,
            DealKind::PercentageItem {
                applicable_product_ids: ids(&["SOAP"]),
                discount_percentage: Decimal::from(50),
            },
        );
        let soap = || vec![product("SOAP", 500, "Household", "")];
        let amounts = |outcome: &DealOutcome| -> Vec<(String, Decimal)> {
            outcome
                .applied_deals
                .iter()
                .map(|applied| (applied.deal_name.clone(), applied.amount))
                .collect()
        };

        let fixed_first = apply_deals(
            &catalog(soap(), vec![four_off.clone(), half_off.clone()]),
            &[ListItem::new("SOAP", 1)],
        );

        assert_eq!(
            fixed_first.applied_deals_summary,
            vec![
                "$4 off soap applied to SOAP item (-$4.00)".to_string(),
                "Half price soap applied to SOAP item (-$1.00)".to_string(),
            ]
        );
        assert_eq!(
            amounts(&fixed_first),
            vec![
                ("$4 off soap".to_string(), money(400)),
                ("Half price soap".to_string(), money(100)),
            ]
        );
        assert_eq!(fixed_first.total_discount, money(500));
        assert_eq!(
            fixed_first.processed_items[0].applied_deals,
            vec!["$4 off soap".to_string(), "Half price soap".to_string()]
        );

        let percent_first = apply_deals(
            &catalog(soap(), vec![half_off, four_off]),
            &[ListItem::new("SOAP", 1)],
        );

        assert_eq!(
            amounts(&percent_first),
            vec![
                ("Half price soap".to_string(), money(250)),
                ("$4 off soap".to_string(), money(250)),
            ]
        );
        assert_eq!(percent_first.total_discount, money(500));
    }

    #[test]
    fn inactive_deals_are_skipped() {
        let mut half_off = deal(
            "Half price soap",
            10,
            DealKind::PercentageItem {
                applicable_product_ids: ids(&["SOAP"]),
                discount_percentage: Decimal::from(50),
            },
        );
        half_off.active = false;
        let catalog = catalog(vec![product("SOAP", 500, "Household", "")], vec![half_off]);

        let outcome = apply_deals(&catalog, &[ListItem::new("SOAP", 1)]);

        assert_eq!(outcome.total_discount, money(0));
        assert!(outcome.applied_deals_summary.is_empty());
    }

    #[test]
    fn bundle_discount_is_shared_by_line_value() {
        let catalog = catalog(
            vec![product("BIG", 600, "Pantry", ""), product("SMALL", 200, "Pantry", "")],
            vec![deal(
                "Any 3 save $2",
                1,
                DealKind::BundleThreshold {
                    applicable_product_ids: ids(&["BIG", "SMALL"]),
                    min_quantity_for_deal: 3,
                    discount_value: money(200),
                },
            )],
        );

        let outcome =
            apply_deals(&catalog, &[ListItem::new("BIG", 1), ListItem::new("SMALL", 2)]);

        assert_eq!(outcome.total_discount, money(200));
        assert_eq!(outcome.processed_items[0].applied_discount_per_unit, money(120));
        assert_eq!(outcome.processed_items[1].applied_discount_per_unit, money(40));
        assert_eq!(
            outcome.applied_deals_summary,
            vec!["Any 3 save $2 applied (-$2.00)".to_string()]
        );
    }

    #[test]
    fn bundle_below_threshold_applies_nothing() {
        let catalog = catalog(
            vec![product("BIG", 600, "Pantry", "")],
            vec![deal(
                "Any 3 save $2",
                1,
                DealKind::BundleThreshold {
                    applicable_product_ids: ids(&["BIG"]),
                    min_quantity_for_deal: 3,
                    discount_value: money(200),
                },
            )],
        );

        let outcome = apply_deals(&catalog, &[ListItem::new("BIG", 2)]);

        assert_eq!(outcome.total_discount, money(0));
        assert!(outcome.applied_deals.is_empty());
    }

    #[test]
    fn unknown_products_become_zero_priced_placeholders() {
        let catalog = catalog(vec![product("CHIPS", 500, "Snacks", "")], Vec::new());

        let outcome =
            apply_deals(&catalog, &[ListItem::new("CHIPS", 1), ListItem::new("MYSTERY", 3)]);

        let placeholder = &outcome.processed_items[1];
        assert_eq!(placeholder.product_name, "Unknown Product (ID: MYSTERY)");
        assert_eq!(placeholder.category, "N/A");
        assert_eq!(placeholder.brand, "N/A");
        assert_eq!(placeholder.original_price, money(0));
        assert_eq!(outcome.total_before_discount, money(500));
    }

    #[test]
    fn pricing_is_idempotent_and_totals_are_ordered() {
        let catalog = catalog(
            vec![product("CHIPS", 499, "Snacks", ""), product("SALSA", 349, "Snacks", "")],
            vec![
                deal(
                    "Snacks 15%",
                    5,
                    DealKind::PercentageCategory {
                        category_restriction: "Snacks".to_string(),
                        discount_percentage: Decimal::from(15),
                        excluded_subcategories: Vec::new(),
                    },
                ),
                deal(
                    "Chips BOGO",
                    1,
                    DealKind::Bogo {
                        applicable_product_ids: ids(&["CHIPS"]),
                        min_quantity_for_deal: 2,
                        apply_to_n_lowest_price: 1,
                    },
                ),
            ],
        );
        let items = vec![ListItem::new("CHIPS", 3), ListItem::new("SALSA", 1)];
        let engine = PriorityDealEngine;

        let first = engine.price(&catalog, &items);
        let second = engine.price(&catalog, &items);

        assert_eq!(first, second);
        assert!(first.total_before_discount >= first.total_after_discount);
        assert!(first.total_after_discount >= Decimal::ZERO);
        assert!(first
            .processed_items
            .iter()
            .all(|line| line.final_price_per_unit >= Decimal::ZERO));
        let recorded: Decimal = first.applied_deals.iter().map(|entry| entry.amount).sum();
        assert_eq!(recorded, first.total_discount);
    }

    #[test]
    fn money_rounds_half_to_even_with_two_digit_scale() {
        assert_eq!(round_money(Decimal::new(1005, 3)).to_string(), "1.00");
        assert_eq!(round_money(Decimal::new(1015, 3)).to_string(), "1.02");
        assert_eq!(round_money(Decimal::from(3)).to_string(), "3.00");
    }

    #[test]
    fn money_serializes_as_json_numbers() {
        let catalog = catalog(
            vec![product("CHIPS", 349, "Snacks", "Chips")],
            vec![deal(
                "Snacks 10%",
                1,
                DealKind::PercentageCategory {
                    category_restriction: "Snacks".to_string(),
                    discount_percentage: Decimal::TEN,
                    excluded_subcategories: Vec::new(),
                },
            )],
        );

        let outcome = apply_deals(&catalog, &[ListItem::new("CHIPS", 2)]);
        let encoded = serde_json::to_value(&outcome).expect("serialize outcome");

        assert_eq!(encoded["total_before_discount"], json!(6.98));
        assert_eq!(encoded["total_discount"], json!(0.7));
        assert_eq!(encoded["total_after_discount"], json!(6.28));
        assert_eq!(encoded["processed_items"][0]["original_price"], json!(3.49));
        assert_eq!(encoded["applied_deals"][0]["amount"], json!(0.7));
    }
}
