//! Issue certificate use case
//!
//! Builds a self-signed CA certificate and CA-issued leaf certificates, with
//! every signature produced by a module-backed key.

use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use rand::rngs::OsRng;
use rand::RngCore;
use rsa::pkcs1v15::Signature;
use tracing::info;
use x509_cert::builder::{Builder, CertificateBuilder, Profile};
use x509_cert::der::asn1::{Ia5String, ObjectIdentifier, OctetString};
use x509_cert::der::Decode;
use x509_cert::ext::pkix::name::GeneralName;
use x509_cert::ext::pkix::{ExtendedKeyUsage, SubjectAltName};
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::SubjectPublicKeyInfoOwned;
use x509_cert::time::Validity;
use x509_cert::Certificate;

use crate::adapters::ModuleCertSigner;
use crate::error::TpmcredResult;
use crate::model::PublicKey;
use crate::ports::SigningCredential;

const ID_KP_SERVER_AUTH: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.3.1");
const ID_KP_CLIENT_AUTH: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.3.2");

/// Names and lifetime of a leaf certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafRequest {
    pub common_name: String,
    pub dns_names: Vec<String>,
    pub ip_addresses: Vec<IpAddr>,
    pub validity: Duration,
}

impl LeafRequest {
    pub fn new(common_name: impl Into<String>) -> Self {
        Self {
            common_name: common_name.into(),
            ..Self::default()
        }
    }
}

impl Default for LeafRequest {
    fn default() -> Self {
        Self {
            common_name: String::new(),
            dns_names: Vec::new(),
            ip_addresses: Vec::new(),
            validity: Duration::from_secs(24 * 60 * 60),
        }
    }
}

fn random_serial() -> TpmcredResult<SerialNumber> {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    // Positive and without a leading zero byte
    bytes[0] = (bytes[0] & 0x7F) | 0x01;
    Ok(SerialNumber::new(&bytes)?)
}

fn common_name(cn: &str) -> TpmcredResult<Name> {
    Ok(Name::from_str(&format!("CN={}", cn))?)
}

fn spki(key: &PublicKey) -> TpmcredResult<SubjectPublicKeyInfoOwned> {
    let der = key.to_spki_der()?;
    Ok(SubjectPublicKeyInfoOwned::from_der(&der)?)
}

/// Create a self-signed CA certificate for the signer's own key
///
/// # Errors
///
/// Returns `TpmcredError::Certificate` if encoding fails, or the module
/// error if signing fails
pub fn issue_ca_certificate<C: SigningCredential>(
    signer: &ModuleCertSigner<C>,
    cn: &str,
    validity: Duration,
) -> TpmcredResult<Certificate> {
    let subject_key = spki(signer.credential().public())?;
    let builder = CertificateBuilder::new(
        Profile::Root,
        random_serial()?,
        Validity::from_now(validity)?,
        common_name(cn)?,
        subject_key,
        signer,
    )?;

    let certificate = builder.build::<Signature>()?;
    info!("Issued CA certificate for CN={}", cn);
    Ok(certificate)
}

/// Issue a leaf certificate for `subject_key`, signed by the CA key
///
/// The certificate carries the requested DNS names and IP addresses as
/// subjectAltName and is valid for both server and client authentication.
pub fn issue_leaf_certificate<C: SigningCredential>(
    ca_signer: &ModuleCertSigner<C>,
    ca_certificate: &Certificate,
    subject_key: &PublicKey,
    request: &LeafRequest,
) -> TpmcredResult<Certificate> {
    let profile = Profile::Leaf {
        issuer: ca_certificate.tbs_certificate.subject.clone(),
        enable_key_agreement: false,
        enable_key_encipherment: false,
    };
    let mut builder = CertificateBuilder::new(
        profile,
        random_serial()?,
        Validity::from_now(request.validity)?,
        common_name(&request.common_name)?,
        spki(subject_key)?,
        ca_signer,
    )?;

    let mut names = Vec::with_capacity(request.dns_names.len() + request.ip_addresses.len());
    for dns in &request.dns_names {
        names.push(GeneralName::DnsName(Ia5String::new(dns)?));
    }
    for ip in &request.ip_addresses {
        let octets = match ip {
            IpAddr::V4(v4) => v4.octets().to_vec(),
            IpAddr::V6(v6) => v6.octets().to_vec(),
        };
        names.push(GeneralName::IpAddress(OctetString::new(octets)?));
    }
    if !names.is_empty() {
        builder.add_extension(&SubjectAltName(names))?;
    }
    builder.add_extension(&ExtendedKeyUsage(vec![ID_KP_SERVER_AUTH, ID_KP_CLIENT_AUTH]))?;

    let certificate = builder.build::<Signature>()?;
    info!("Issued leaf certificate for CN={}", request.common_name);
    Ok(certificate)
}
