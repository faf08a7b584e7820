use crate::scenario::definition::*;
use cartpath_common::protocol::Role;

/// Listing page straight to cart: pick any product summary's add-to-cart
/// button, then open the cart.
pub fn definition() -> ScenarioDefinition {
    ScenarioDefinition {
        name: "addToCart".to_string(),
        description: Some(
            "Randomly select a product summary and click its add-to-cart button".to_string(),
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
            Stage::PickAndClick {
                role: Role::AddToCartButton,
                within: Some(Role::ProductSummary),
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
