//! Type registry - one storage engine per logical record type.
//!
//! ```text
//!   storage_for::<Firm>("firm") ──▶ ┌──────────────┐   first call builds,
//!   storage_for_class::<Firm>()  ──▶ │ TypeRegistry │   later calls share
//!                                   └──────┬───────┘
//!                                          ▼
//!                              Arc<StorageEngine<Firm>>
//! ```

mod type_name;
mod type_registry;

pub use type_name::type_name_from_class;
pub use type_registry::TypeRegistry;
