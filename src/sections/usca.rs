use crate::sections::us_common::GpcSegment;
use iab_gpp_decode_derive::{FromBitReader, GPPSection};
#[cfg(feature = "serde")]
use serde::Serialize;

/// US California section (id 8).
#[derive(Debug, Clone, Eq, PartialEq, GPPSection)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[non_exhaustive]
#[gpp(with_optional_segments)]
pub struct UsCa {
    pub core: Core,
    #[gpp(optional_segment_type = 1, embedded)]
    pub gpc: Option<GpcSegment>,
}

/// The core sub-section must always be present.
///
/// Values are the raw 2-bit codes of the encoding: 0 means not applicable, and the meaning of
/// 1 and 2 depends on the field (provided / not provided, opted out / did not opt out, no
/// consent / consent, yes / no).
#[derive(Debug, Clone, Eq, PartialEq, FromBitReader)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[non_exhaustive]
pub struct Core {
    #[gpp(u6)]
    pub version: u8,
    #[gpp(u2)]
    pub sale_opt_out_notice: u8,
    #[gpp(u2)]
    pub sharing_opt_out_notice: u8,
    #[gpp(u2)]
    pub sensitive_data_limit_use_notice: u8,
    #[gpp(u2)]
    pub sale_opt_out: u8,
    #[gpp(u2)]
    pub sharing_opt_out: u8,
    /// Opt-outs of the use or disclosure of sensitive personal information, in order:
    /// identification documents, financial data, precise geolocation, racial or ethnic origin,
    /// communications content, genetic data, biometric data, health data, sex life or sexual
    /// orientation.
    #[gpp(two_bit_field(9))]
    pub sensitive_data_processing: Vec<u8>,
    /// Consents for known children under 13 and from 13 to 16.
    #[gpp(two_bit_field(2))]
    pub known_child_sensitive_data_consents: Vec<u8>,
    #[gpp(u2)]
    pub personal_data_consents: u8,
    #[gpp(u2)]
    pub mspa_covered_transaction: u8,
    #[gpp(u2)]
    pub mspa_opt_out_option_mode: u8,
    #[gpp(u2)]
    pub mspa_service_provider_mode: u8,
}
