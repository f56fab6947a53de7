//! Self-signed certificate generation
//!
//! Hooks that register admission or conversion webhooks need a serving
//! certificate before any CA infrastructure exists. This module generates a
//! self-signed certificate with the requested SANs; the cryptography is
//! delegated to `rcgen`.

use rcgen::{
    CertificateParams, DistinguishedName, DnType, DnValue, IsCa, KeyPair, KeyUsagePurpose,
    SanType, string::Ia5String,
};

use crate::error::{KubeError, Result};

/// Default validity period for generated certificates
const DEFAULT_VALIDITY_DAYS: i64 = 365;

/// Parameters for a self-signed certificate
#[derive(Debug, Clone)]
pub struct CertificateOptions {
    /// Subject common name
    pub common_name: String,
    /// Subject organization, omitted when `None`
    pub organization: Option<String>,
    /// DNS names and IP addresses for the SAN extension
    pub sans: Vec<String>,
    /// Validity window starting now
    pub validity_days: i64,
}

impl CertificateOptions {
    pub fn new(common_name: impl Into<String>) -> Self {
        Self {
            common_name: common_name.into(),
            organization: None,
            sans: Vec::new(),
            validity_days: DEFAULT_VALIDITY_DAYS,
        }
    }

    pub fn with_sans<I, S>(mut self, sans: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sans = sans.into_iter().map(Into::into).collect();
        self
    }
}

/// A generated certificate and its private key, both PEM-encoded
#[derive(Debug, Clone)]
pub struct SelfSignedCertificate {
    pub cert_pem: String,
    pub key_pem: String,
}

/// Generate a self-signed serving certificate
pub fn generate_self_signed(options: &CertificateOptions) -> Result<SelfSignedCertificate> {
    let mut params = CertificateParams::default();

    let mut dn = DistinguishedName::new();
    dn.push(
        DnType::CommonName,
        DnValue::Utf8String(options.common_name.clone()),
    );
    if let Some(org) = &options.organization {
        dn.push(DnType::OrganizationName, DnValue::Utf8String(org.clone()));
    }
    params.distinguished_name = dn;

    params.is_ca = IsCa::NoCa;
    params.key_usages = vec![
        KeyUsagePurpose::DigitalSignature,
        KeyUsagePurpose::KeyEncipherment,
    ];
    params.extended_key_usages = vec![rcgen::ExtendedKeyUsagePurpose::ServerAuth];

    let now = time::OffsetDateTime::now_utc();
    params.not_before = now;
    params.not_after = now + time::Duration::days(options.validity_days);

    params.subject_alt_names = options
        .sans
        .iter()
        .map(|san| parse_san(san))
        .collect::<Result<Vec<_>>>()?;

    let key_pair = KeyPair::generate()
        .map_err(|e| KubeError::Certificate(format!("failed to generate key: {}", e)))?;
    let key_pem = key_pair.serialize_pem();

    let cert = params
        .self_signed(&key_pair)
        .map_err(|e| KubeError::Certificate(format!("failed to self-sign: {}", e)))?;

    Ok(SelfSignedCertificate {
        cert_pem: cert.pem(),
        key_pem,
    })
}

/// Classify a SAN entry as an IP address or a DNS name
fn parse_san(san: &str) -> Result<SanType> {
    if let Ok(ip) = san.parse::<std::net::IpAddr>() {
        return Ok(SanType::IpAddress(ip));
    }
    Ia5String::try_from(san.to_string())
        .map(SanType::DnsName)
        .map_err(|e| KubeError::Certificate(format!("invalid DNS name '{}': {}", san, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_self_signed_pem() {
        let cert = generate_self_signed(
            &CertificateOptions::new("webhook.addons.svc")
                .with_sans(["webhook.addons.svc", "10.0.0.1"]),
        )
        .unwrap();

        assert!(cert.cert_pem.starts_with("-----BEGIN CERTIFICATE-----"));
        assert!(cert.key_pem.contains("PRIVATE KEY"));
    }

    #[test]
    fn test_parse_san_ip_and_dns() {
        assert!(matches!(parse_san("10.1.2.3").unwrap(), SanType::IpAddress(_)));
        assert!(matches!(
            parse_san("svc.cluster.local").unwrap(),
            SanType::DnsName(_)
        ));
    }

    #[test]
    fn test_parse_san_rejects_non_ascii() {
        assert!(parse_san("пример.example").is_err());
    }

    #[test]
    fn test_default_validity() {
        let options = CertificateOptions::new("cn");
        assert_eq!(options.validity_days, DEFAULT_VALIDITY_DAYS);
    }
}
