//! The purchasable token package catalog.
//!
//! Packages are configuration data, not runtime entities: the catalog ships
//! with the service and is listed verbatim to clients.

use serde::{Deserialize, Serialize};

/// A purchasable bundle of balance tokens at a fixed Rupiah price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPackage {
    /// Catalog id (`pack_100`, `pack_500`, ...).
    pub id: String,

    /// Tokens credited on successful payment.
    pub tokens: i64,

    /// Price in Rupiah.
    pub price: i64,

    /// Display label.
    pub label: String,

    /// Optional discount tag shown next to the label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<String>,
}

/// The built-in package catalog.
#[must_use]
pub fn default_catalog() -> Vec<TokenPackage> {
    fn package(id: &str, tokens: i64, price: i64, label: &str, discount: Option<&str>) -> TokenPackage {
        TokenPackage {
            id: id.to_string(),
            tokens,
            price,
            label: label.to_string(),
            discount: discount.map(String::from),
        }
    }

    vec![
        package("pack_100", 100, 10_000, "Paket Pemula", None),
        package("pack_500", 500, 45_000, "Paket Standar", Some("10%")),
        package("pack_1000", 1000, 80_000, "Paket Pro", Some("20%")),
        package("pack_2500", 2500, 175_000, "Paket Premium", Some("30%")),
        package("pack_5000", 5000, 300_000, "Paket Ultimate", Some("40%")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_five_packages_with_unique_ids() {
        let catalog = default_catalog();
        assert_eq!(catalog.len(), 5);
        let ids: std::collections::HashSet<_> = catalog.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn starter_package_has_no_discount() {
        let catalog = default_catalog();
        assert!(catalog[0].discount.is_none());
        let json = serde_json::to_value(&catalog[0]).unwrap();
        assert!(json.get("discount").is_none());
    }

    #[test]
    fn larger_packages_are_cheaper_per_token() {
        let catalog = default_catalog();
        for window in catalog.windows(2) {
            let per_token_a = window[0].price as f64 / window[0].tokens as f64;
            let per_token_b = window[1].price as f64 / window[1].tokens as f64;
            assert!(per_token_b < per_token_a);
        }
    }
}
