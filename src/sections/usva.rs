use iab_gpp_decode_derive::{FromBitReader, GPPSection};
#[cfg(feature = "serde")]
use serde::Serialize;

/// US Virginia section (id 9). It has no optional sub-sections.
#[derive(Debug, Clone, Eq, PartialEq, GPPSection)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[non_exhaustive]
pub struct UsVa {
    pub core: Core,
}

#[derive(Debug, Clone, Eq, PartialEq, FromBitReader)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[non_exhaustive]
pub struct Core {
    #[gpp(u6)]
    pub version: u8,
    #[gpp(u2)]
    pub sharing_notice: u8,
    #[gpp(u2)]
    pub sale_opt_out_notice: u8,
    #[gpp(u2)]
    pub targeted_advertising_opt_out_notice: u8,
    #[gpp(u2)]
    pub sale_opt_out: u8,
    #[gpp(u2)]
    pub targeted_advertising_opt_out: u8,
    /// Consents to the processing of sensitive data: racial or ethnic origin, religious beliefs,
    /// health, sex life or orientation, citizenship, genetic data, biometric data, precise
    /// geolocation.
    #[gpp(two_bit_field(8))]
    pub sensitive_data_processing: Vec<u8>,
    #[gpp(two_bit_field(1))]
    pub known_child_sensitive_data_consents: Vec<u8>,
    #[gpp(u2)]
    pub mspa_covered_transaction: u8,
    #[gpp(u2)]
    pub mspa_opt_out_option_mode: u8,
    #[gpp(u2)]
    pub mspa_service_provider_mode: u8,
}
