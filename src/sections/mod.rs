//! Traits, helpers, and type definitions for working with GPP sections.
//!
//! Every identifier defined by the GPP standard is listed in [`SectionId`], but only a few of
//! them have a typed decoder in this crate. Decoders are looked up in a [`SectionRegistry`]:
//! the [default registry](SectionRegistry::default) knows about [`UsCa`] and [`UsVa`], and
//! additional decoders can be registered by callers for any identifier.
//!
//! Sections without a registered decoder are kept as [`GenericSection`] values, holding their
//! raw encoded text.
//!
//! Note that the GPP specification states that each section specification is supposed to be
//! independent. As a consequence, there is some duplication between implementations of these
//! sections.
use crate::core::base64::DecodeError;
use crate::core::bits::parse_u2;
use crate::core::{BitReader, FieldError, FromBitReader};
use crate::sections::usca::UsCa;
use crate::sections::usva::UsVa;
use crate::v1::{Decoded, GPPDecodeError};
use fnv::{FnvHashMap, FnvHashSet};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
#[cfg(feature = "serde")]
use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use strum_macros::{Display, IntoStaticStr};
use thiserror::Error;

pub mod us_common;
pub mod usca;
pub mod usva;

#[derive(
    Clone, Copy, Debug, Display, IntoStaticStr, Eq, PartialEq, Hash, PartialOrd, Ord, FromPrimitive,
)]
#[strum(serialize_all = "lowercase")]
#[non_exhaustive]
pub enum SectionId {
    TcfEuV1 = 1,
    TcfEuV2 = 2,
    GppHeader = 3,
    GppSignalIntegrity = 4,
    TcfCaV1 = 5,
    UspV1 = 6,
    UsNat = 7,
    UsCa = 8,
    UsVa = 9,
    UsCo = 10,
    UsUt = 11,
    UsCt = 12,
    UsFl = 13,
    UsMt = 14,
    UsOr = 15,
    UsTx = 16,
    UsDe = 17,
    UsIa = 18,
    UsNe = 19,
    UsNh = 20,
    UsNj = 21,
    UsTn = 22,
}

impl SectionId {
    /// Short lowercase name of the section, such as `usca`.
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn from_id(id: u16) -> Option<Self> {
        Self::from_u16(id)
    }
}

impl From<SectionId> for u16 {
    fn from(id: SectionId) -> Self {
        id as u16
    }
}

#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum SectionDecodeError {
    #[error("unable to decode segment: {0}")]
    DecodeSegment(#[from] DecodeError),
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error("unknown segment type {segment_type}")]
    UnknownSegmentType { segment_type: u8 },
    #[error("duplicate segment type {segment_type}")]
    DuplicateSegmentType { segment_type: u8 },
}

/// A section which could not be decoded.
///
/// The rest of the string is still decoded, these errors are collected alongside the
/// successfully decoded sections.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[error("error parsing {name} consent string: {source}")]
pub struct SectionError {
    pub id: u16,
    pub name: &'static str,
    pub source: SectionDecodeError,
}

/// A section kept in its raw encoded form.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct GenericSection {
    id: u16,
    raw: String,
}

impl GenericSection {
    pub fn new(id: u16, raw: impl Into<String>) -> Self {
        Self {
            id,
            raw: raw.into(),
        }
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn raw_value(&self) -> &str {
        &self.raw
    }
}

/// A section decoded by one of the registered decoders.
#[derive(Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TypedSection {
    id: u16,
    name: &'static str,
    raw: String,
    fields: SectionFields,
}

impl TypedSection {
    pub fn new(id: u16, name: &'static str, raw: impl Into<String>, fields: SectionFields) -> Self {
        Self {
            id,
            name,
            raw: raw.into(),
            fields,
        }
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    /// Name of the decoder which produced this section.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn raw_value(&self) -> &str {
        &self.raw
    }

    pub fn fields(&self) -> &SectionFields {
        &self.fields
    }
}

#[derive(Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(untagged))]
pub enum Section {
    Generic(GenericSection),
    Typed(TypedSection),
}

impl Section {
    pub fn id(&self) -> u16 {
        match self {
            Section::Generic(s) => s.id(),
            Section::Typed(s) => s.id(),
        }
    }

    /// The section text exactly as it appeared in the GPP string.
    pub fn raw_value(&self) -> &str {
        match self {
            Section::Generic(s) => s.raw_value(),
            Section::Typed(s) => s.raw_value(),
        }
    }

    /// Returns the standard identifier of this section, if it is a known one.
    pub fn section_id(&self) -> Option<SectionId> {
        SectionId::from_id(self.id())
    }

    pub fn fields(&self) -> Option<&SectionFields> {
        match self {
            Section::Generic(_) => None,
            Section::Typed(s) => Some(s.fields()),
        }
    }

    /// Returns the decoded content of this section if it is a `T`.
    pub fn decode<T>(&self) -> Option<&T>
    where
        T: DecodableSection,
    {
        self.fields().and_then(T::from_fields)
    }
}

/// Decoded content of a typed section.
#[derive(Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(untagged))]
pub enum SectionFields {
    UsCa(UsCa),
    UsVa(UsVa),
    #[cfg_attr(feature = "serde", serde(serialize_with = "serialize_custom"))]
    Custom(Box<dyn ConsentFields>),
}

impl SectionFields {
    /// Returns the content produced by a custom decoder, if it is a `T`.
    pub fn downcast_ref<T>(&self) -> Option<&T>
    where
        T: Any,
    {
        match self {
            SectionFields::Custom(f) => f.downcast_ref(),
            _ => None,
        }
    }
}

#[cfg(feature = "serde")]
#[allow(clippy::borrowed_box)]
fn serialize_custom<S>(fields: &Box<dyn ConsentFields>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(&format_args!("{fields:?}"))
}

/// Content produced by decoders registered with [`SectionRegistry::register_fn`].
///
/// Implemented for every `Debug + Eq` type which is `Send + Sync + 'static`.
pub trait ConsentFields: fmt::Debug + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;

    fn eq_fields(&self, other: &dyn ConsentFields) -> bool;
}

impl<T> ConsentFields for T
where
    T: fmt::Debug + Eq + Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_fields(&self, other: &dyn ConsentFields) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }
}

impl dyn ConsentFields {
    pub fn downcast_ref<T>(&self) -> Option<&T>
    where
        T: Any,
    {
        self.as_any().downcast_ref()
    }
}

impl PartialEq for dyn ConsentFields {
    fn eq(&self, other: &Self) -> bool {
        self.eq_fields(other)
    }
}

impl Eq for dyn ConsentFields {}

/// A section type with a typed decoder, usually derived with `#[derive(GPPSection)]`.
pub trait DecodableSection:
    FromStr<Err = SectionDecodeError> + Into<SectionFields> + Send + Sync + 'static
{
    const ID: SectionId;

    fn from_fields(fields: &SectionFields) -> Option<&Self>;
}

/// Decodes the raw text of one section.
pub trait SectionDecoder: Send + Sync {
    /// Name used in error messages.
    fn name(&self) -> &'static str;

    fn decode(&self, s: &str) -> Result<SectionFields, SectionDecodeError>;
}

struct TypedDecoder<T>(PhantomData<fn() -> T>);

impl<T> SectionDecoder for TypedDecoder<T>
where
    T: DecodableSection,
{
    fn name(&self) -> &'static str {
        T::ID.name()
    }

    fn decode(&self, s: &str) -> Result<SectionFields, SectionDecodeError> {
        Ok(s.parse::<T>()?.into())
    }
}

pub type DecodeFn = fn(&mut BitReader) -> Result<Box<dyn ConsentFields>, FieldError>;

struct FnDecoder {
    name: &'static str,
    f: DecodeFn,
}

impl SectionDecoder for FnDecoder {
    fn name(&self) -> &'static str {
        self.name
    }

    fn decode(&self, s: &str) -> Result<SectionFields, SectionDecodeError> {
        let mut r = BitReader::from_base64(s)?;
        Ok(SectionFields::Custom((self.f)(&mut r)?))
    }
}

/// Mapping of section identifiers to their decoders.
///
/// ```
/// use iab_gpp_decode::sections::usca::UsCa;
/// use iab_gpp_decode::sections::SectionRegistry;
///
/// let mut registry = SectionRegistry::new();
/// registry.register::<UsCa>();
///
/// let decoded = registry.decode("DBABBgA~xlgWEYCZAA").unwrap();
/// assert!(decoded.container.get::<UsCa>().is_some());
/// ```
pub struct SectionRegistry {
    decoders: FnvHashMap<u16, Box<dyn SectionDecoder>>,
}

impl SectionRegistry {
    /// Creates an empty registry, with which every section decodes as a [`GenericSection`].
    pub fn new() -> Self {
        Self {
            decoders: FnvHashMap::default(),
        }
    }

    /// Registers the typed decoder of `T` under its standard identifier.
    pub fn register<T>(&mut self) -> &mut Self
    where
        T: DecodableSection,
    {
        self.register_decoder(T::ID.into(), TypedDecoder::<T>(PhantomData))
    }

    /// Registers a decoder for any identifier, replacing the previous one if any.
    pub fn register_decoder<D>(&mut self, id: u16, decoder: D) -> &mut Self
    where
        D: SectionDecoder + 'static,
    {
        self.decoders.insert(id, Box::new(decoder));
        self
    }

    /// Registers a function decoding the bits of a single Base64 segment.
    pub fn register_fn(&mut self, id: u16, name: &'static str, f: DecodeFn) -> &mut Self {
        self.register_decoder(id, FnDecoder { name, f })
    }

    pub fn get(&self, id: u16) -> Option<&dyn SectionDecoder> {
        self.decoders.get(&id).map(|d| d.as_ref())
    }

    pub fn contains(&self, id: u16) -> bool {
        self.decoders.contains_key(&id)
    }

    /// Decodes a GPP string with the decoders of this registry.
    pub fn decode(&self, s: &str) -> Result<Decoded, GPPDecodeError> {
        crate::v1::decode_with(s, self)
    }
}

impl Default for SectionRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register::<UsCa>().register::<UsVa>();
        registry
    }
}

impl fmt::Debug for SectionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids = self.decoders.keys().collect::<Vec<_>>();
        ids.sort();
        f.debug_struct("SectionRegistry").field("ids", &ids).finish()
    }
}

pub(crate) trait Base64EncodedStr<T> {
    fn parse_base64_str(&self) -> Result<T, SectionDecodeError>;
}

impl<T> Base64EncodedStr<T> for str
where
    T: FromBitReader,
{
    fn parse_base64_str(&self) -> Result<T, SectionDecodeError> {
        let mut r = BitReader::from_base64(self)?;
        Ok(r.parse()?)
    }
}

/// A trait representing an operation to parse segments for a Base64-URL encoded string
/// using '.' as separators into a type composed of a mandatory core segment and an arbitrary
/// number of optional segments.
///
/// This guarantees a given segment cannot appear twice.
pub(crate) trait SegmentedStr<T> {
    fn parse_segmented_str(&self) -> Result<T, SectionDecodeError>;
}

impl<T> SegmentedStr<T> for str
where
    T: OptionalSegmentParser,
{
    fn parse_segmented_str(&self) -> Result<T, SectionDecodeError> {
        let mut segments_iter = self.split('.');

        // first mandatory segment is the core segment
        let mut core = BitReader::from_base64(segments_iter.next().unwrap_or_default())?;
        let mut output = core.parse()?;
        let mut segments = FnvHashSet::default();

        // parse each optional segment and fill the output
        for s in segments_iter {
            let mut r = BitReader::from_base64(s)?;
            let segment_type = T::read_segment_type(&r)?;

            // already present, duplicate segments is an error
            if !segments.insert(segment_type) {
                return Err(SectionDecodeError::DuplicateSegmentType { segment_type });
            }

            T::parse_optional_segment(segment_type, &mut r, &mut output)?;
        }

        if segments.is_empty() {
            T::parse_trailing_segment(&mut core, &mut output);
        }

        Ok(output)
    }
}

/// A trait representing an operation to parse optional segments for a Base64-URL encoded string
pub(crate) trait OptionalSegmentParser: Sized + FromBitReader {
    /// Peeks at the 2-bit type of the segment starting at the current position.
    fn read_segment_type(r: &BitReader) -> Result<u8, SectionDecodeError> {
        parse_u2(r.data(), r.position())
            .map_err(|e| SectionDecodeError::from(FieldError::new("segment_type", e)))
    }

    fn parse_optional_segment(
        segment_type: u8,
        r: &mut BitReader,
        into: &mut Self,
    ) -> Result<(), SectionDecodeError>;

    /// Parses an optional segment packed right after the core bits, when there is no
    /// '.' separated segment. Leaves `into` untouched if none can be read.
    fn parse_trailing_segment(_r: &mut BitReader, _into: &mut Self) {}
}
