use super::registry::ScenarioRegistry;

pub mod add_to_cart;
pub mod add_to_cart_from_pdp;

/// Register all built-in journeys into the registry.
pub fn register_all(registry: &mut ScenarioRegistry) {
    registry.register(add_to_cart::definition());
    registry.register(add_to_cart_from_pdp::definition());
}
