use crate::scenario::definition::*;
use cartpath_common::protocol::Role;

/// Listing → product detail page → color → size → add to cart → cart.
pub fn definition() -> ScenarioDefinition {
    ScenarioDefinition {
        name: "addToCartFromPDP".to_string(),
        description: Some(
            "Open a random product's detail page, pick its SKUs and add it to the cart"
                .to_string(),
        ),
        tier: ScenarioTier::BuiltIn,
        stages: vec![
            Stage::Navigate {
                url: "/".to_string(),
            },
            Stage::Wait {
                delay_ms: 3000,
                role: Some(Role::ProductSummary),
            },
            // No check that the detail page actually loaded; the next wait
            // absorbs the transition.
            Stage::PickAndClick {
                role: Role::ProductSummary,
                within: None,
            },
            Stage::Wait {
                delay_ms: 2000,
                role: Some(Role::ColorSkuOption),
            },
            Stage::PickVariant {
                role: Role::ColorSkuOption,
            },
            Stage::Wait {
                delay_ms: 1000,
                role: Some(Role::SizeSkuOption),
            },
            Stage::PickVariant {
                role: Role::SizeSkuOption,
            },
            Stage::Wait {
                delay_ms: 3000,
                role: Some(Role::AddToCartButton),
            },
            Stage::Click {
                role: Role::AddToCartButton,
            },
            Stage::Wait {
                delay_ms: 500,
                role: Some(Role::CartButton),
            },
            Stage::Click {
                role: Role::CartButton,
            },
        ],
    }
}
