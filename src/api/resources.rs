//! Record types for the BidWaves collections the client lists.

use std::fmt;

use serde::de::{self, DeserializeOwned, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use crate::enum_display_fromstr;
use crate::error::BidwavesError;

/// A record served by a REST collection endpoint.
pub trait Resource: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    /// Collection path relative to the API base, e.g. `/order`.
    const ENDPOINT: &'static str;
    /// Columns the backend accepts as a search parameter. The first is the default.
    const SEARCH_COLUMNS: &'static [&'static str];
    /// Table headers, matching [`Resource::row`].
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> &str;

    fn row(&self) -> Vec<String>;
}

/// Collections addressable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Order,
    Billing,
    Campaign,
    Product,
    Suggestion,
}

enum_display_fromstr!(
    ResourceKind,
    BidwavesError::unknown_resource,
    {
        Order => "order",
        Billing => "billing",
        Campaign => "campaign",
        Product => "product",
        Suggestion => "suggestion",
    }
);

impl ResourceKind {
    /// Parse a kind, accepting the plural form (`orders`).
    pub fn parse_loose(s: &str) -> crate::error::Result<Self> {
        let trimmed = s.trim();
        trimmed
            .parse::<ResourceKind>()
            .or_else(|_| trimmed.strip_suffix('s').unwrap_or(trimmed).parse())
            .map_err(|_| BidwavesError::UnknownResource(s.to_string()))
    }

    pub fn endpoint(self) -> &'static str {
        match self {
            ResourceKind::Order => Order::ENDPOINT,
            ResourceKind::Billing => Billing::ENDPOINT,
            ResourceKind::Campaign => Campaign::ENDPOINT,
            ResourceKind::Product => Product::ENDPOINT,
            ResourceKind::Suggestion => Suggestion::ENDPOINT,
        }
    }

    pub fn search_columns(self) -> &'static [&'static str] {
        match self {
            ResourceKind::Order => Order::SEARCH_COLUMNS,
            ResourceKind::Billing => Billing::SEARCH_COLUMNS,
            ResourceKind::Campaign => Campaign::SEARCH_COLUMNS,
            ResourceKind::Product => Product::SEARCH_COLUMNS,
            ResourceKind::Suggestion => Suggestion::SEARCH_COLUMNS,
        }
    }
}

/// An advertising order (campaign budget line).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(deserialize_with = "record_id")]
    pub id: String,
    pub name: String,
    pub status: Option<String>,
    pub budget: Option<f64>,
    pub active: Option<bool>,
    pub created_at: Option<String>,
}

impl Resource for Order {
    const ENDPOINT: &'static str = "/order";
    const SEARCH_COLUMNS: &'static [&'static str] = &["name", "id"];
    const COLUMNS: &'static [&'static str] = &["ID", "Name", "Status", "Budget", "Active", "Created"];

    fn id(&self) -> &str {
        &self.id
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            opt(&self.status),
            money(self.budget),
            flag(self.active),
            opt(&self.created_at),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Billing {
    #[serde(deserialize_with = "record_id")]
    pub id: String,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub status: Option<String>,
    pub paid: Option<bool>,
    pub created_at: Option<String>,
}

impl Resource for Billing {
    const ENDPOINT: &'static str = "/billing";
    const SEARCH_COLUMNS: &'static [&'static str] = &["description"];
    const COLUMNS: &'static [&'static str] =
        &["ID", "Description", "Amount", "Currency", "Status", "Paid", "Created"];

    fn id(&self) -> &str {
        &self.id
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            opt(&self.description),
            money(self.amount),
            opt(&self.currency),
            opt(&self.status),
            flag(self.paid),
            opt(&self.created_at),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    #[serde(deserialize_with = "record_id")]
    pub id: String,
    pub name: String,
    pub channel: Option<String>,
    pub status: Option<String>,
    pub active: Option<bool>,
}

impl Resource for Campaign {
    const ENDPOINT: &'static str = "/campaign";
    const SEARCH_COLUMNS: &'static [&'static str] = &["name"];
    const COLUMNS: &'static [&'static str] = &["ID", "Name", "Channel", "Status", "Active"];

    fn id(&self) -> &str {
        &self.id
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            opt(&self.channel),
            opt(&self.status),
            flag(self.active),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(deserialize_with = "record_id")]
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub price: Option<f64>,
}

impl Resource for Product {
    const ENDPOINT: &'static str = "/product";
    const SEARCH_COLUMNS: &'static [&'static str] = &["name", "category"];
    const COLUMNS: &'static [&'static str] = &["ID", "Name", "Category", "Price"];

    fn id(&self) -> &str {
        &self.id
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            opt(&self.category),
            money(self.price),
        ]
    }
}

/// A backend-curated recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    #[serde(deserialize_with = "record_id")]
    pub id: String,
    pub title: String,
    pub kind: Option<String>,
    pub accepted: Option<bool>,
}

impl Resource for Suggestion {
    const ENDPOINT: &'static str = "/suggestion";
    const SEARCH_COLUMNS: &'static [&'static str] = &["title"];
    const COLUMNS: &'static [&'static str] = &["ID", "Title", "Kind", "Accepted"];

    fn id(&self) -> &str {
        &self.id
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.title.clone(),
            opt(&self.kind),
            flag(self.accepted),
        ]
    }
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn money(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_default()
}

fn flag(value: Option<bool>) -> String {
    match value {
        Some(true) => "yes".to_string(),
        Some(false) => "no".to_string(),
        None => String::new(),
    }
}

/// Record ids arrive as JSON numbers from some endpoints and strings from others.
fn record_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct IdVisitor;

    impl Visitor<'_> for IdVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or integer id")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_and_string_ids() {
        let numeric: Order = serde_json::from_str(r#"{"id": 42, "name": "Spring sale"}"#).unwrap();
        assert_eq!(numeric.id(), "42");
        assert!(numeric.status.is_none());

        let text: Order = serde_json::from_str(r#"{"id": "ord_7", "name": "Launch"}"#).unwrap();
        assert_eq!(text.id(), "ord_7");
    }

    #[test]
    fn test_camel_case_fields() {
        let billing: Billing = serde_json::from_str(
            r#"{"id": 1, "amount": 120.5, "paid": true, "createdAt": "2024-03-01"}"#,
        )
        .unwrap();
        assert_eq!(billing.created_at.as_deref(), Some("2024-03-01"));
        assert_eq!(
            billing.row(),
            vec!["1", "", "120.50", "", "", "yes", "2024-03-01"]
        );
    }

    #[test]
    fn test_row_matches_columns() {
        let product = Product {
            id: "3".to_string(),
            name: "Banner".to_string(),
            category: None,
            price: Some(9.0),
        };
        assert_eq!(product.row().len(), Product::COLUMNS.len());
    }

    #[test]
    fn test_resource_kind_parse() {
        assert_eq!(
            ResourceKind::parse_loose("orders").unwrap(),
            ResourceKind::Order
        );
        assert_eq!(
            ResourceKind::parse_loose("Billing").unwrap(),
            ResourceKind::Billing
        );
        assert!(ResourceKind::parse_loose("invoices").is_err());
        assert_eq!(ResourceKind::Suggestion.endpoint(), "/suggestion");
        assert_eq!(ResourceKind::Product.search_columns(), &["name", "category"]);
    }
}
