//! Version 1 of the IAB Global Privacy Platform string.
//!
//! A GPP string contains a header which lists the sections which are present
//! in the next optional parts.
//!
//! A typical GPP string will look like this:
//!
//! ```text
//! DBACNY~CPXxRfAPXxRfAAfKABENB-CgAAAAAAAAAAYgAAAAAAAA~1YNN
//! ```
//!
//! It contains a header (`DBACNY`) and two sections separated by a `~` character.
//! The header lists the identifiers of the sections, here 2 (TCF EU v2) and 6 (USP v1).
//!
//! Decoding is done in two steps. The header is decoded first, and any error there is fatal.
//! Each section is then handed to the decoder registered for its identifier. A section which
//! fails to decode does not prevent the others from being decoded: its error is collected in
//! [`Decoded::errors`].
//!
//! # Examples
//!
//! ```
//! use iab_gpp_decode::v1::{decode, GPPDecodeError};
//!
//! fn main() -> Result<(), GPPDecodeError> {
//!     let decoded = decode("DBACNY~CPXxRfAPXxRfAAfKABENB-CgAAAAAAAAAAYgAAAAAAAA~1YNN")?;
//!
//!     assert_eq!(decoded.container.section_ids(), &[2, 6]);
//!     assert_eq!(decoded.container.sections()[1].raw_value(), "1YNN");
//!     assert!(decoded.errors.is_empty());
//!
//!     Ok(())
//! }
//! ```
//!
//! Since [`Decoded`] implements the [`FromStr`] trait, [`str::parse`] can be used as well:
//!
//! ```
//! use iab_gpp_decode::sections::usca::UsCa;
//! use iab_gpp_decode::v1::{Decoded, GPPDecodeError};
//!
//! fn main() -> Result<(), GPPDecodeError> {
//!     let decoded: Decoded = "DBABBgA~xlgWEYCZAA".parse()?;
//!     let usca = decoded.container.get::<UsCa>().unwrap();
//!
//!     assert_eq!(usca.core.version, 49);
//!
//!     Ok(())
//! }
//! ```
use crate::core::base64::DecodeError;
use crate::core::range::RangeError;
use crate::core::FieldError;
use crate::sections::{
    DecodableSection, GenericSection, Section, SectionError, SectionRegistry, TypedSection,
};
#[cfg(feature = "serde")]
use serde::Serialize;
use std::str::FromStr;
use thiserror::Error;

mod header;

pub use header::{decode_header, validate_header, Header};

/// The error type for GPP String decoding operations.
///
/// All of these are fatal: no section is decoded.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum GPPDecodeError {
    #[error("error parsing GPP header, should be at least 4 bytes long")]
    TooShort,
    /// The header has an invalid type for this version of GPP.
    #[error("error parsing GPP header, header must have type=3")]
    InvalidHeaderType { found: u8 },
    #[error("error parsing GPP header, {0}")]
    Decode(#[from] DecodeError),
    #[error("error parsing GPP header, {0}")]
    Field(#[from] FieldError),
    #[error("error parsing GPP header, section identifiers: {0}")]
    SectionIds(#[from] RangeError),
    /// The header lists more sections than the string contains.
    #[error("ids do not match sections (number of ids {ids}, number of sections {sections})")]
    IdSectionMismatch { ids: usize, sections: usize },
}

/// The content of a GPP string.
#[derive(Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct GPPContainer {
    version: u8,
    section_ids: Vec<u16>,
    sections: Vec<Section>,
}

impl GPPContainer {
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Every section identifier listed in the header, in order.
    pub fn section_ids(&self) -> &[u16] {
        &self.section_ids
    }

    /// Successfully decoded sections, in the order of the string.
    ///
    /// Sections which failed to decode are absent, so indices do not necessarily match
    /// [`section_ids`](Self::section_ids).
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn into_sections(self) -> Vec<Section> {
        self.sections
    }

    /// Returns the first section with the given identifier.
    pub fn section(&self, id: u16) -> Option<&Section> {
        self.sections.iter().find(|s| s.id() == id)
    }

    /// Returns the decoded content of a typed section.
    ///
    /// Returns [`None`] if the section is absent, failed to decode, or was decoded by another
    /// decoder than the one of `T`.
    pub fn get<T>(&self) -> Option<&T>
    where
        T: DecodableSection,
    {
        self.section(T::ID.into()).and_then(Section::decode)
    }
}

/// The result of decoding a GPP string whose header is valid.
#[derive(Debug, Eq, PartialEq)]
pub struct Decoded {
    pub container: GPPContainer,
    /// Errors of the sections which could not be decoded, in the order of the string.
    pub errors: Vec<SectionError>,
}

impl Decoded {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the container only if every section was decoded.
    pub fn into_result(self) -> Result<GPPContainer, Vec<SectionError>> {
        if self.errors.is_empty() {
            Ok(self.container)
        } else {
            Err(self.errors)
        }
    }
}

impl FromStr for Decoded {
    type Err = GPPDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}

/// Decodes a GPP string using the [default registry](SectionRegistry::default).
pub fn decode(s: &str) -> Result<Decoded, GPPDecodeError> {
    decode_with(s, &SectionRegistry::default())
}

/// Decodes a GPP string using the decoders of `registry`.
pub fn decode_with(s: &str, registry: &SectionRegistry) -> Result<Decoded, GPPDecodeError> {
    let mut segments_iter = s.split('~');
    let header_str = segments_iter.next().unwrap_or_default();

    validate_header(header_str)?;
    let header = decode_header(header_str)?;
    let segments = segments_iter.collect::<Vec<_>>();

    let ids = header.section_ids.len();
    if ids > segments.len() {
        return Err(GPPDecodeError::IdSectionMismatch {
            ids,
            sections: segments.len(),
        });
    }
    if segments.len() > ids {
        log::debug!(
            "ignoring {} segments not listed in the GPP header",
            segments.len() - ids
        );
    }

    let mut sections = Vec::with_capacity(ids);
    let mut errors = vec![];

    for (&id, raw) in header.section_ids.iter().zip(segments) {
        match decode_section(registry, id, raw) {
            Ok(section) => sections.push(section),
            Err(e) => {
                log::debug!("section {id} skipped: {e}");
                errors.push(e);
            }
        }
    }

    Ok(Decoded {
        container: GPPContainer {
            version: header.version,
            section_ids: header.section_ids,
            sections,
        },
        errors,
    })
}

fn decode_section(registry: &SectionRegistry, id: u16, raw: &str) -> Result<Section, SectionError> {
    let Some(decoder) = registry.get(id) else {
        log::trace!("no decoder for section {id}, keeping it raw");
        return Ok(Section::Generic(GenericSection::new(id, raw)));
    };

    let name = decoder.name();
    log::trace!("decoding section {id} as {name}");

    match decoder.decode(raw) {
        Ok(fields) => Ok(Section::Typed(TypedSection::new(id, name, raw, fields))),
        Err(source) => Err(SectionError { id, name, source }),
    }
}
