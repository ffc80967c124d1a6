pub mod number;
pub mod provider;

pub use provider::HoverProvider;

#[cfg(test)]
#[path = "../../tests/src/hover/number_tests.rs"]
mod tests;
