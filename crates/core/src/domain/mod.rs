pub mod deal;
pub mod inventory;
pub mod layout;
pub mod list;
pub mod product;
pub mod purchase;
pub mod substitution;
