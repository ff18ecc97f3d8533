use std::sync::LazyLock;

use regex::Regex;

use crate::error::DppError;

const PRODUCT_KEY_PATTERN: &str = r"^urn:epc:id:([a-zA-Z0-9_]+):([a-zA-Z0-9.\-]+)(\.[\w.\-]+)*$";

static PRODUCT_KEY: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(PRODUCT_KEY_PATTERN));

fn product_key() -> Result<&'static Regex, DppError> {
    PRODUCT_KEY
        .as_ref()
        .map_err(|err| DppError::Internal(format!("product identifier pattern: {}", err)))
}

/// Checks that a product identifier is an EPC URN such as `urn:epc:id:sgtin:4012345.011111.1001`.
pub fn validate_product_identifier(key: &str) -> Result<(), DppError> {
    if product_key()?.is_match(key) {
        Ok(())
    } else {
        Err(DppError::validation(format!(
            "invalid product identifier '{}': expected an EPC URN like urn:epc:id:sgtin:...",
            key
        )))
    }
}

/// Site identifier as an SGLN URN; empty input stays empty.
pub fn sgln(site_id: &str) -> String {
    if site_id.is_empty() {
        String::new()
    } else {
        format!("urn:epc:id:sgln:{}.0.0", site_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_epc_urns() {
        assert!(validate_product_identifier("urn:epc:id:sgtin:4012345.011111.1001").is_ok());
        assert!(validate_product_identifier("urn:epc:id:lgtin:4012345.099.B-17").is_ok());
    }

    #[test]
    fn rejects_other_shapes() {
        for key in ["", "sgtin:4012345", "urn:epc:id:sgtin", "urn:epc:id::123", "urn:epc:id:sgtin:a b"] {
            assert!(matches!(
                validate_product_identifier(key),
                Err(DppError::Validation(_))
            ));
        }
    }

    #[test]
    fn product_key_pattern_compiles() {
        assert!(product_key().is_ok());
    }

    #[test]
    fn formats_site_locations() {
        assert_eq!(sgln("4012345000009"), "urn:epc:id:sgln:4012345000009.0.0");
        assert_eq!(sgln(""), "");
    }
}
