//! Linkograph Core - Engine for linkograph analysis
//!
//! This crate provides the linkograph data type, construction from labeled
//! events, structural consistency checks, statistics and the bijective
//! enumeration of link topologies. It performs no I/O.

pub mod builder;
pub mod check;
pub mod enumeration;
pub mod error;
pub mod limits;
pub mod linkograph;
pub mod stats;
pub mod wire;

pub use builder::build_linkograph;
pub use check::{check_structure, NodeErrors, StructureReport};
pub use enumeration::{
    decode, decode_range, encode, frequency, histogram, ontology_from_codes,
    sub_linkograph_frequency, total_linkographs, Enumeration, FrequencyOptions, LinkCode,
    ModularCounter,
};
pub use error::{Error, Result};
pub use linkograph::{InverseLabeling, Linkograph, Node, Ontology};
pub use stats::{LinkDirection, LinkEntropyOptions, NodeValue, SubgraphQuery, Window};
