//! This crate decodes IAB Global Privacy Platform (GPP)
//! [consent strings](https://github.com/InteractiveAdvertisingBureau/Global-Privacy-Platform).
//!
//! It decodes the header of version 1 strings, and the fields of the US California (`usca`) and
//! US Virginia (`usva`) sections. Every other section is kept as its raw string, unless a decoder
//! is registered for it.
//!
//! NOTE: This is not an official IAB library.
//!
//! # Decoding GPP strings
//!
//! A GPP Consent String is made of a mandatory header and a list of sections, separated by `~`.
//!
//! ```
//! # use std::error::Error;
//! #
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use iab_gpp_decode::v1::decode;
//!
//! let decoded = decode("DBABBgA~xlgWEYCZAA")?;
//!
//! for section in decoded.container.sections() {
//!     println!("{}: {}", section.id(), section.raw_value());
//! }
//!
//! // sections which could not be decoded are reported separately
//! for error in &decoded.errors {
//!     println!("{error}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Accessing section data
//!
//! Typed sections are retrieved with [`GPPContainer::get`](v1::GPPContainer::get).
//!
//! ```
//! # use std::error::Error;
//! #
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use iab_gpp_decode::sections::usca::UsCa;
//! use iab_gpp_decode::v1::decode;
//!
//! let decoded = decode("DBABBgA~xlgWEYCZAA")?;
//! let usca = decoded.container.get::<UsCa>().ok_or("missing section")?;
//!
//! assert_eq!(usca.core.sensitive_data_processing.len(), 9);
//! assert_eq!(usca.gpc.map(|g| g.gpc), Some(false));
//! # Ok(())
//! # }
//! ```
//!
//! # Custom sections
//!
//! Decoders for other sections can be added to a [`SectionRegistry`](sections::SectionRegistry).
//!
//! ```
//! # use std::error::Error;
//! #
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use iab_gpp_decode::core::{BitReader, FieldError};
//! use iab_gpp_decode::sections::{ConsentFields, Section, SectionRegistry};
//!
//! #[derive(Debug, Eq, PartialEq)]
//! struct Version(u8);
//!
//! fn version(r: &mut BitReader) -> Result<Box<dyn ConsentFields>, FieldError> {
//!     let v = r.read_u6().map_err(|e| FieldError::new("version", e))?;
//!     Ok(Box::new(Version(v)))
//! }
//!
//! let mut registry = SectionRegistry::default();
//! registry.register_fn(11, "usut", version);
//!
//! let decoded = registry.decode("DBABFg~BVKAAAA")?;
//! let fields = decoded.container.section(11).and_then(Section::fields);
//!
//! assert_eq!(fields.and_then(|f| f.downcast_ref::<Version>()), Some(&Version(1)));
//! # Ok(())
//! # }
//! ```
pub mod core;
pub mod sections;
pub mod v1;
