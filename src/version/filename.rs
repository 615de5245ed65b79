//! Guessing a version from an archive's file name.

/// Extracts the raw version token from an archive file name.
///
/// The token starts at the first digit that directly follows a `-` or `_` and
/// runs to the end of the name, minus a trailing `.jar`. The result is not
/// normalized.
///
/// ```
/// use pkgscan::version::extract_version;
///
/// assert_eq!(extract_version("foo-2.0.jar").as_deref(), Some("2.0"));
/// assert_eq!(extract_version("tomcat-i18n-es.jar"), None);
/// ```
pub fn extract_version(filename: &str) -> Option<String> {
    let mut previous_was_separator = false;
    let mut start = None;

    for (idx, c) in filename.char_indices() {
        if previous_was_separator && c.is_ascii_digit() {
            start = Some(idx);
            break;
        }
        previous_was_separator = c == '-' || c == '_';
    }

    let captured = &filename[start?..];
    Some(captured.strip_suffix(".jar").unwrap_or(captured).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::normalize;

    fn normalized(filename: &str) -> Option<String> {
        extract_version(filename).map(|v| normalize(&v))
    }

    #[test]
    fn test_raw_tokens() {
        assert_eq!(extract_version("sdfoo-2.0.jar").as_deref(), Some("2.0"));
        assert_eq!(extract_version("fdsfoo-2.0_something.jar").as_deref(), Some("2.0_something"));
        assert_eq!(extract_version("fwwoo-2.0-beta.jar").as_deref(), Some("2.0-beta"));
        assert_eq!(extract_version("fofdso-2.jar").as_deref(), Some("2"));
        assert_eq!(extract_version("foaao4-2.jar").as_deref(), Some("2"));
        assert_eq!(extract_version("log4j-1.2.8.jar").as_deref(), Some("1.2.8"));
        assert_eq!(extract_version("xmlrpc-2.0+xmlrpc61.jar").as_deref(), Some("2.0+xmlrpc61"));
    }

    #[test]
    fn test_no_separator_led_digit() {
        assert_eq!(extract_version("foo-alpha.jar"), None);
        assert_eq!(extract_version("tomcat-i18n-es.jar"), None);
        assert_eq!(extract_version("swan.jar"), None);
        assert_eq!(extract_version(""), None);
    }

    #[test]
    fn test_digit_after_letter_does_not_start_capture() {
        assert_eq!(extract_version("stuff-foo2-2.3.4.jar").as_deref(), Some("2.3.4"));
        assert_eq!(normalized("stuff-foo2-2.3.4.jar").as_deref(), Some("2.3.4"));
    }

    #[test]
    fn test_only_jar_suffix_is_stripped() {
        assert_eq!(extract_version("foo-1.0.zip").as_deref(), Some("1.0.zip"));
        assert_eq!(extract_version("foo-1.0").as_deref(), Some("1.0"));
    }

    #[test]
    fn test_normalized_filename_versions() {
        assert_eq!(normalized("wsdl4j-1.6.1.jar").as_deref(), Some("1.6.1"));
        assert_eq!(normalized("wsdl4j-1.6.jar").as_deref(), Some("1.6.0"));
        assert_eq!(normalized("wsdl4j-1.jar").as_deref(), Some("1.0.0"));
        assert_eq!(normalized("wsdl4j-1.6.1.3.5.jar").as_deref(), Some("1.6.1.35"));
        assert_eq!(normalized("wsdl4j-1.2.3RC3.jar").as_deref(), Some("1.2.0.3RC3"));
        assert_eq!(normalized("wsdl4j-1.2.3-RC4.jar").as_deref(), Some("1.2.3.RC4"));
        assert_eq!(normalized("wsdl4j-1.2.3.RC4.jar").as_deref(), Some("1.2.3.RC4"));
        assert_eq!(normalized("wsdl4j-1.2.3_RC4.jar").as_deref(), Some("1.2.3.RC4"));
        assert_eq!(normalized("wsdl4j-1.2.3/RC4.jar").as_deref(), Some("1.2.3.RC4"));
        assert_eq!(normalized("tomcat-i18n-es.jar"), None);
    }
}
