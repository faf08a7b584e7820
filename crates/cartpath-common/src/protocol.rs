use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic UI roles a scenario can target.
///
/// Each role maps to a concrete locator string through a fixture; the
/// engine never looks at the locator itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    ProductSummary,
    ProductSummaryContainer,
    ProductInfoData,
    AddToCartButton,
    ColorSkuOption,
    SizeSkuOption,
    CartButton,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::ProductSummary,
        Role::ProductSummaryContainer,
        Role::ProductInfoData,
        Role::AddToCartButton,
        Role::ColorSkuOption,
        Role::SizeSkuOption,
        Role::CartButton,
    ];

    /// The fixture key for this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::ProductSummary => "productSummary",
            Role::ProductSummaryContainer => "productSummaryContainer",
            Role::ProductInfoData => "productInfoData",
            Role::AddToCartButton => "addToCartButton",
            Role::ColorSkuOption => "colorSkuOption",
            Role::SizeSkuOption => "sizeSkuOption",
            Role::CartButton => "cartButton",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| format!("unknown role '{}'", s))
    }
}

/// Opaque handle to an element resolved on the live page.
///
/// Handles are only valid until the next navigation; backends hand out
/// fresh ids on every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    pub id: u32,
}

impl ElementHandle {
    pub fn new(id: u32) -> Self {
        Self { id }
    }
}

/// How an element advertises that it is the currently selected option.
///
/// Written as a one-key map in fixtures and config: `class: <name>` or
/// `attribute: <name>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MarkerFields", into = "MarkerFields")]
pub enum Marker {
    /// The element carries this CSS class.
    Class(String),
    /// The element carries this attribute with a value other than `"false"`.
    Attribute(String),
}

impl Default for Marker {
    fn default() -> Self {
        Marker::Class("vtex-store-components-3-x-skuSelectorItem--selected".to_string())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct MarkerFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attribute: Option<String>,
}

impl TryFrom<MarkerFields> for Marker {
    type Error = String;

    fn try_from(fields: MarkerFields) -> Result<Self, Self::Error> {
        match (fields.class, fields.attribute) {
            (Some(class), None) => Ok(Marker::Class(class)),
            (None, Some(attribute)) => Ok(Marker::Attribute(attribute)),
            (Some(_), Some(_)) => Err("marker takes either `class` or `attribute`, not both".into()),
            (None, None) => Err("marker needs a `class` or `attribute` key".into()),
        }
    }
}

impl From<Marker> for MarkerFields {
    fn from(marker: Marker) -> Self {
        match marker {
            Marker::Class(class) => MarkerFields {
                class: Some(class),
                attribute: None,
            },
            Marker::Attribute(attribute) => MarkerFields {
                class: None,
                attribute: Some(attribute),
            },
        }
    }
}

impl Marker {
    /// Evaluate the marker against raw attribute values read from an element.
    ///
    /// `class_attr` is the element's `class` attribute, `attr_value` the value
    /// of the marker attribute (only consulted for [`Marker::Attribute`]).
    pub fn matches(&self, class_attr: Option<&str>, attr_value: Option<&str>) -> bool {
        match self {
            Marker::Class(name) => class_attr
                .map(|classes| classes.split_whitespace().any(|c| c == name))
                .unwrap_or(false),
            Marker::Attribute(_) => attr_value.map(|v| v != "false").unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NavigationResult {
    pub url: String,
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_fixture_key() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert!("checkoutButton".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_uses_camel_case() {
        let json = serde_json::to_string(&Role::AddToCartButton).unwrap();
        assert_eq!(json, "\"addToCartButton\"");
    }

    #[test]
    fn test_class_marker_matches_whole_class_names() {
        let marker = Marker::Class("sku--selected".into());
        assert!(marker.matches(Some("sku sku--selected"), None));
        assert!(!marker.matches(Some("sku sku--selected-not"), None));
        assert!(!marker.matches(None, None));
    }

    #[test]
    fn test_attribute_marker() {
        let marker = Marker::Attribute("aria-checked".into());
        assert!(marker.matches(None, Some("true")));
        assert!(marker.matches(None, Some("")));
        assert!(!marker.matches(None, Some("false")));
        assert!(!marker.matches(Some("selected"), None));
    }

    #[test]
    fn test_marker_yaml_shape() {
        let marker: Marker = serde_yaml::from_str("class: is-active").unwrap();
        assert_eq!(marker, Marker::Class("is-active".into()));
        let marker: Marker = serde_yaml::from_str("attribute: aria-pressed").unwrap();
        assert_eq!(marker, Marker::Attribute("aria-pressed".into()));
    }

    #[test]
    fn test_marker_needs_exactly_one_key() {
        assert!(serde_yaml::from_str::<Marker>("{}").is_err());
        assert!(serde_yaml::from_str::<Marker>("class: a\nattribute: b").is_err());
        assert!(serde_yaml::from_str::<Marker>("!class is-active").is_err());
    }

    #[test]
    fn test_marker_json_shape() {
        let marker: Marker = serde_json::from_str(r#"{"class":"is-active"}"#).unwrap();
        assert_eq!(marker, Marker::Class("is-active".into()));
        assert_eq!(
            serde_json::to_string(&Marker::Attribute("aria-checked".into())).unwrap(),
            r#"{"attribute":"aria-checked"}"#
        );
    }
}
