use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubstituteCandidate {
    pub substitute_product_id: ProductId,
    #[serde(default)]
    pub substitution_score: f64,
    #[serde(default)]
    pub reason: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubstitutionRule {
    pub original_product_id: ProductId,
    #[serde(default)]
    pub substitutes: Vec<SubstituteCandidate>,
}
