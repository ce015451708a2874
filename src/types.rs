use serde::{Deserialize, Serialize};

use crate::buch::entity::Art;

/// One result page of a criteria search.
///
/// `total_elements` reflects the full matching set, independent of how many
/// entries the current page holds.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitelDto {
    pub titel: String,
    #[serde(default)]
    pub untertitel: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbbildungDto {
    pub beschriftung: String,
    pub content_type: String,
}

/// Request body for creating a Buch (with its references).
#[derive(Debug, Clone, Deserialize)]
pub struct BuchDto {
    pub isbn: String,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub art: Option<Art>,
    pub preis: f64,
    #[serde(default)]
    pub rabatt: Option<f64>,
    #[serde(default)]
    pub lieferbar: bool,
    #[serde(default)]
    pub datum: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub schlagwoerter: Option<Vec<String>>,
    pub titel: TitelDto,
    #[serde(default)]
    pub abbildungen: Option<Vec<AbbildungDto>>,
}

/// Request body for updating a Buch (scalar fields only, no references).
#[derive(Debug, Clone, Deserialize)]
pub struct BuchDtoOhneRef {
    pub isbn: String,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub art: Option<Art>,
    pub preis: f64,
    #[serde(default)]
    pub rabatt: Option<f64>,
    #[serde(default)]
    pub lieferbar: bool,
    #[serde(default)]
    pub datum: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub schlagwoerter: Option<Vec<String>>,
}

/// Request body for creating or fully updating a Bike.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BikeDto {
    pub brand: String,
    pub typ: String,
    #[serde(default)]
    pub frame_size: Option<String>,
    pub price: f64,
    #[serde(default = "default_true")]
    pub available: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct BikePricePatch {
    pub price: f64,
}
