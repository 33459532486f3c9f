//! Ontology domain module.
//!
//! Concrete entities that participate in the command engine: ontology terms,
//! user annotations and the links between them. Pure domain logic (no IO, no
//! HTTP, no storage); every type implements [`annostack_core::DomainEntity`].

pub mod annotation;
pub mod annotation_term;
pub mod geometry;
pub mod term;

pub use annotation::UserAnnotation;
pub use annotation_term::AnnotationTerm;
pub use term::Term;
