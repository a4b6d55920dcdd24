//! Schema lookups: slots, ranges, aliases, and enumerations.
//!
//! A compiled schema document is loaded once into an immutable
//! [`SchemaIndex`] and shared by reference. Every lookup returns `None` on a
//! miss; callers branch on absence.
//!
//! # Example
//!
//! ```
//! use sample_annotator::schema::SchemaIndex;
//!
//! let schema = SchemaIndex::bundled().unwrap();
//! let slot = schema.get_slot("temperature", true).unwrap();
//! assert_eq!(slot.name, "temp");
//! assert!(schema.is_measurement_field("depth"));
//! ```

mod document;
mod index;
mod package;
mod slot;

pub use document::{EnumDocument, PackageDocument, PermissibleValues, SchemaDocument, SlotDocument};
pub use index::{SchemaIndex, normalize_name};
pub use package::EnvPackage;
pub use slot::{Enumeration, SlotDefinition, SlotRange};
