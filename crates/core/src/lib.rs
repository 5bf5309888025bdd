pub mod catalog;
pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;

pub use catalog::{Catalog, CatalogFiles, CatalogLoader, CatalogSummary, LoadedData, SourceStatus};
pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::deal::{Deal, DealKind};
pub use domain::inventory::{InventoryRecord, InventoryTable, StoreId};
pub use domain::layout::{StoreGraph, StoreLayout};
pub use domain::list::{ListChange, ListCommand, ListItem, ShoppingList};
pub use domain::product::{Product, ProductId};
pub use engine::deals::{DealEngine, DealOutcome, PricedLine, PriorityDealEngine};
pub use engine::enrichment::{AnnotatedLine, ResolvedLine};
pub use engine::navigation::{GreedyPathOptimizer, PathOptimizer, RoutePlan, RouteStop};
pub use engine::recommendations::Recommendation;
pub use engine::stock::{StockReport, StockResolver, StockStatus, StockThresholds};
pub use engine::substitutes::{RankedSubstituteResolver, Substitute, SubstituteResolver};
pub use engine::{
    DeterministicListRuntime, ListEvaluation, ListRuntime, ResolvedEvaluation, StoreContext,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
