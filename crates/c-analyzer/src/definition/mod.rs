//! Go-to-definition over the published symbol store.

mod provider;

pub use provider::DefinitionProvider;
