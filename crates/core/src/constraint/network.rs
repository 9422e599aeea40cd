//! Network syntax constraints: `Host`, `Endpoint` and `AllowedScheme`.

use std::net::{IpAddr, Ipv6Addr};

use super::{ConfigureContext, Params, Rule, expect_str, string_only};
use crate::data_type::ParameterDataType;
use crate::error::{ConfigurationErrorKind, ValidationError};
use crate::message::MessageId;
use crate::validation::Violation;
use crate::value::Value;

// ============================================================================
// SYNTAX CHECKS
// ============================================================================

/// Checks a host name per RFC 1123, or an IPv4/IPv6 literal.
///
/// IPv6 literals may be written with or without brackets. A trailing dot
/// (FQDN notation) is accepted.
pub fn check_host(input: &str) -> Result<(), String> {
    if input.is_empty() {
        return Err("host cannot be empty".into());
    }
    if input.parse::<IpAddr>().is_ok() {
        return Ok(());
    }
    if let Some(inner) = input.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        return inner
            .parse::<Ipv6Addr>()
            .map(|_| ())
            .map_err(|_| format!("'{inner}' is not an IPv6 address"));
    }

    let hostname = input.strip_suffix('.').unwrap_or(input);
    if hostname.is_empty() {
        return Err("host must contain at least one label".into());
    }
    if hostname.len() > 253 {
        return Err(format!(
            "length {} exceeds maximum of 253 characters",
            hostname.len()
        ));
    }

    for label in hostname.split('.') {
        if label.is_empty() {
            return Err("labels must not be empty".into());
        }
        if label.len() > 63 {
            return Err(format!("label '{label}' exceeds 63 characters"));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(format!("label '{label}' must not start or end with a hyphen"));
        }
        if let Some(ch) = label.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '-') {
            return Err(format!("label '{label}' contains invalid character '{ch}'"));
        }
    }
    Ok(())
}

/// Checks `host:port` with a port in 1..=65535. IPv6 hosts must be
/// bracketed: `[::1]:8080`.
pub fn check_endpoint(input: &str) -> Result<(), String> {
    let (host, port) = if input.starts_with('[') {
        let close = input.find(']').ok_or("unclosed '[' in IPv6 host")?;
        let port = input[close + 1..]
            .strip_prefix(':')
            .ok_or("missing ':port' after IPv6 host")?;
        (&input[..=close], port)
    } else {
        let (host, port) = input.rsplit_once(':').ok_or("missing ':port'")?;
        if host.contains(':') {
            return Err("IPv6 hosts must be enclosed in brackets".into());
        }
        (host, port)
    };

    check_host(host)?;
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("port '{port}' is not a number"));
    }
    match port.parse::<u16>() {
        Ok(port) if port >= 1 => Ok(()),
        _ => Err(format!("port {port} is outside 1-65535")),
    }
}

// ============================================================================
// HOST / ENDPOINT
// ============================================================================

macro_rules! syntax_constraint {
    ($(#[$meta:meta])* $name:ident, $keyword:literal, $check:path, $message:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name;

        impl Rule for $name {
            const NAME: &'static str = $keyword;

            fn supports(data_type: ParameterDataType) -> bool {
                string_only(data_type)
            }

            fn configure(
                params: Params<'_>,
                _ctx: &ConfigureContext<'_>,
            ) -> Result<Self, ConfigurationErrorKind> {
                params.expect_none()?;
                Ok(Self)
            }

            fn parameters(&self) -> Vec<String> {
                Vec::new()
            }

            fn check(&self, value: &Value) -> Result<Option<Violation>, ValidationError> {
                let text = expect_str(Self::NAME, value)?;
                Ok($check(text)
                    .err()
                    .map(|reason| Violation::new(MessageId::$message, [reason])))
            }
        }
    };
}

pub(crate) use syntax_constraint;

syntax_constraint! {
    /// `[Host]`: an RFC 1123 host name or an IP literal.
    HostConstraint, "Host", check_host, InvalidHost
}

syntax_constraint! {
    /// `[Endpoint]`: `host:port`.
    EndpointConstraint, "Endpoint", check_endpoint, InvalidEndpoint
}

// ============================================================================
// ALLOWED SCHEME
// ============================================================================

/// `[AllowedScheme(http,https)]`: the URI scheme is one of the listed ones.
///
/// Schemes compare case-insensitively and render in lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AllowedSchemeConstraint {
    schemes: Vec<String>,
}

fn is_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

impl AllowedSchemeConstraint {
    pub fn schemes(&self) -> &[String] {
        &self.schemes
    }

    pub fn allows(&self, scheme: &str) -> bool {
        self.schemes.iter().any(|s| s.eq_ignore_ascii_case(scheme))
    }
}

impl Rule for AllowedSchemeConstraint {
    const NAME: &'static str = "AllowedScheme";

    fn supports(data_type: ParameterDataType) -> bool {
        data_type == ParameterDataType::Uri
    }

    fn configure(params: Params<'_>, _ctx: &ConfigureContext<'_>) -> Result<Self, ConfigurationErrorKind> {
        params.expect_count(1, usize::MAX)?;
        let mut schemes = Vec::with_capacity(params.len());
        for (index, scheme) in params.iter().enumerate() {
            if !is_scheme(scheme) {
                return Err(params.invalid(index, "not a URI scheme"));
            }
            schemes.push(scheme.to_ascii_lowercase());
        }
        Ok(Self { schemes })
    }

    fn parameters(&self) -> Vec<String> {
        self.schemes.clone()
    }

    fn check(&self, value: &Value) -> Result<Option<Violation>, ValidationError> {
        let Value::Uri(uri) = value else {
            return Err(ValidationError::UnsupportedValue {
                constraint: Self::NAME.to_owned(),
                value_type: value.data_type(),
            });
        };
        Ok((!self.allows(uri.scheme())).then(|| {
            Violation::new(
                MessageId::SchemeNotAllowed,
                [uri.scheme().to_owned(), self.schemes.join(", ")],
            )
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("example.com")]
    #[case("localhost")]
    #[case("example.com.")]
    #[case("a-b.c-d.e")]
    #[case("192.168.0.1")]
    #[case("::1")]
    #[case("[fe80::1]")]
    fn valid_hosts(#[case] host: &str) {
        assert!(check_host(host).is_ok(), "{host} should be valid");
    }

    #[rstest]
    #[case("")]
    #[case(".")]
    #[case("-bad.com")]
    #[case("bad-.com")]
    #[case("a..b")]
    #[case("under_score.com")]
    #[case("[not-ip]")]
    fn invalid_hosts(#[case] host: &str) {
        assert!(check_host(host).is_err(), "{host} should be invalid");
    }

    #[test]
    fn label_and_total_length_limits() {
        let label = "a".repeat(64);
        assert!(check_host(&label).is_err());
        let long = ["a".repeat(63).as_str(); 5].join(".");
        assert!(check_host(&long).is_err());
    }

    #[rstest]
    #[case("example.com:443", true)]
    #[case("[::1]:8080", true)]
    #[case("10.0.0.1:65535", true)]
    #[case("example.com", false)]
    #[case("example.com:0", false)]
    #[case("example.com:65536", false)]
    #[case("example.com:http", false)]
    #[case("::1:80", false)]
    #[case("[::1]", false)]
    fn endpoints(#[case] input: &str, #[case] valid: bool) {
        assert_eq!(check_endpoint(input).is_ok(), valid, "{input}");
    }

    #[test]
    fn allowed_scheme() {
        let values = vec!["HTTPS".to_owned(), "ftp".to_owned()];
        let constraint = AllowedSchemeConstraint::configure(
            Params::new(&values),
            &ConfigureContext::unresolved(ParameterDataType::Uri),
        )
        .unwrap();
        assert_eq!(constraint.parameters(), vec!["https".to_owned(), "ftp".to_owned()]);

        let ok = Value::Uri("https://example.com".parse().unwrap());
        let bad = Value::Uri("http://example.com".parse().unwrap());
        assert!(constraint.check(&ok).unwrap().is_none());
        assert!(constraint.check(&bad).unwrap().is_some());
    }

    #[test]
    fn scheme_parameters_are_checked() {
        let values = vec!["1http".to_owned()];
        assert!(AllowedSchemeConstraint::configure(
            Params::new(&values),
            &ConfigureContext::unresolved(ParameterDataType::Uri),
        )
        .is_err());
    }
}
