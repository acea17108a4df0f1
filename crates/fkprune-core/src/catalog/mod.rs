//! Model catalog.
//!
//! The catalog describes logical models, the physical tables behind them, and
//! the parent associations each model declares. It is the static half of
//! schema reflection; live columns and discriminator values come from the
//! database through [`CatalogReflection`](crate::reflection::CatalogReflection).

mod association;
mod model;
mod registry;

pub use association::{
    foreign_key_for_table, singularize, AssociationTarget, BelongsTo, LEFT_SIDE_PLACEHOLDER,
};
pub use model::ModelDef;
pub use registry::ModelCatalog;
