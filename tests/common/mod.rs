use iab_gpp_decode::v1::decode;
use serde::Deserialize;
use std::fs::File;
use std::io;
use std::io::ErrorKind;
use std::path::Path;

#[derive(Deserialize)]
pub struct TestCase {
    gpp_string: String,
    expected_version: u8,
    expected_section_ids: Vec<u16>,
    expected_raw_sections: Vec<String>,
    #[serde(default)]
    expected_errors: Vec<String>,
    /// Serialized form of the decoded sections, only checked with the `serde` feature.
    #[serde(default)]
    #[cfg_attr(not(feature = "serde"), allow(dead_code))]
    expected_sections: Option<serde_json::Value>,
}

impl TestCase {
    pub fn load_from_file<P: AsRef<Path>>(p: P) -> io::Result<Self> {
        let f = File::open(p)?;
        let tc: Self = serde_json::from_reader(&f)
            .map_err(|e| io::Error::new(ErrorKind::InvalidData, e.to_string()))?;
        Ok(tc)
    }

    pub fn assert_matches(&self) {
        let decoded = decode(&self.gpp_string).expect("invalid GPP string");
        let container = &decoded.container;

        assert_eq!(container.version(), self.expected_version);
        assert_eq!(container.section_ids(), self.expected_section_ids.as_slice());

        let raw_sections = container
            .sections()
            .iter()
            .map(|s| s.raw_value())
            .collect::<Vec<_>>();
        assert_eq!(raw_sections, self.expected_raw_sections);

        let errors = decoded
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>();
        assert_eq!(errors, self.expected_errors);

        #[cfg(feature = "serde")]
        if let Some(expected) = &self.expected_sections {
            use assert_json_diff::assert_json_eq;

            let actual = serde_json::to_value(container.sections()).expect("serializable sections");
            assert_json_eq!(actual, expected);
        }
    }
}
