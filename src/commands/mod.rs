//! Command model, catalog and argument binding.
//!
//! Registrations are plain data built with builders; the shell reads them
//! through a [`CommandCatalog`] snapshot and never mutates them.

pub mod binding;
pub mod catalog;
pub mod help;
pub mod option;
pub mod output;
pub mod registration;
pub mod standard;
pub mod tokenizer;

pub use binding::{bind, BindingError, BoundArguments, OptionValue};
pub use catalog::{CommandCatalog, InMemoryCatalog, Registrations};
pub use help::GroupsInfo;
pub use option::{CommandOption, OptionArity, OptionType};
pub use output::{CommandOutput, ControlAction};
pub use registration::{CommandContext, CommandRegistration, CommandTarget, DEFAULT_GROUP};
