//! JSON arguments given inline or as `@path`.

use anyhow::Context;
use serde::de::DeserializeOwned;

/// Decode an argument that is either a JSON literal or `@<file>` holding one.
pub fn parse<T: DeserializeOwned>(argument: &str) -> anyhow::Result<T> {
    match argument.strip_prefix('@') {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read payload file {}", path))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("payload file {} is not valid JSON for this argument", path))
        }
        None => serde_json::from_str(argument).context("inline payload is not valid JSON for this argument"),
    }
}

/// Like [`parse`], for optional arguments.
pub fn parse_opt<T: DeserializeOwned>(argument: Option<&str>) -> anyhow::Result<Option<T>> {
    argument.map(parse).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpp_types::{QualitySpecification, QualitySubmission};
    use std::io::Write;

    #[test]
    fn test_inline_payload() {
        let submission: QualitySubmission =
            parse(r#"{"testName":"Weight","result":"15","unit":"kg"}"#).unwrap();
        assert_eq!(submission, QualitySubmission::new("Weight", "15").with_unit("kg"));
    }

    #[test]
    fn test_file_payload() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"testName":"Weight","isNumeric":true,"lowerLimit":10,"upperLimit":20,"unit":"kg","isMandatory":true}}]"#
        )
        .unwrap();

        let specs: Vec<QualitySpecification> =
            parse(&format!("@{}", file.path().display())).unwrap();
        assert_eq!(
            specs,
            vec![QualitySpecification::numeric("Weight", 10.0, 20.0)
                .with_unit("kg")
                .mandatory()]
        );
    }

    #[test]
    fn test_bad_payloads() {
        assert!(parse::<Vec<String>>("not json").is_err());
        assert!(parse::<Vec<String>>("@/nonexistent/payload.json").is_err());
        assert_eq!(parse_opt::<Vec<String>>(None).unwrap(), None);
    }
}
