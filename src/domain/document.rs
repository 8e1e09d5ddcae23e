//! Document payload accepted by the submission endpoint.
//!
//! Field names follow the wire schema exactly, including the one camelCase
//! outlier (`importRequest`) and the nested `description.participantInn`.
//! Dates travel as `YYYY-MM-DD` strings. Absent optional fields are omitted
//! from the serialized object.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Participant block nested under `description`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Description {
    #[serde(rename = "participantInn", skip_serializing_if = "Option::is_none")]
    pub participant_inn: Option<String>,
}

/// A single product line of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_document: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_document_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_document_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_inn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producer_inn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tnved_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uit_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uitu_code: Option<String>,
}

/// Document submitted to the remote endpoint.
///
/// The caller owns the document; submission only borrows it.
///
/// # Example
/// ```
/// use document_throttle::{Document, Product};
///
/// let doc = Document {
///     doc_id: Some("12345".to_string()),
///     import_request: true,
///     ..Document::default()
/// }
/// .with_product(Product {
///     uit_code: Some("uit".to_string()),
///     ..Product::default()
/// });
///
/// let json = doc.to_json().unwrap();
/// assert!(json.contains("\"importRequest\":true"));
/// assert!(json.contains("\"uit_code\":\"uit\""));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Description>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    #[serde(rename = "importRequest")]
    pub import_request: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_inn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_inn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producer_inn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_type: Option<String>,
    pub products: Vec<Product>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reg_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reg_number: Option<String>,
}

impl Document {
    /// Append a product line.
    pub fn with_product(mut self, product: Product) -> Self {
        self.products.push(product);
        self
    }

    /// Serialize to the wire representation.
    ///
    /// # Errors
    /// Returns the serializer error unchanged.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a document from its wire representation.
    ///
    /// # Errors
    /// Returns an error if `json` is not a valid document object.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
