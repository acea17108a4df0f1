//! Foreign key constraints and their lifecycle during a run.

mod foreign_key;
mod manager;
mod naming;

pub use foreign_key::{ForeignKeyConstraint, ReferentialAction};
pub use manager::ConstraintManager;
pub use naming::generate_constraint_name;
