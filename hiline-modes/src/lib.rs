//! # hiline-modes
//!
//! Ready-made grammars for the engine, and the registry that maps file names onto them.
//!
//!     - [doc_comment]: `/** ... */` documentation comments, meant to be embedded.
//!     - [rapture]: the Rapture scripting language.
//!     - [registry]: syntax descriptors (id, name, file extensions) and lookup.
//!
//! Built-in tables are compiled lazily on first use and shared from then on.

pub mod doc_comment;
pub mod rapture;
pub mod registry;

pub use registry::{RegistryError, Syntax, SyntaxDescriptor, SyntaxRegistry};
