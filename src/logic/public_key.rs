use rsa::{BigUint, RsaPublicKey};
use tracing::debug;

use crate::error::{ModuleError, TpmcredError, TpmcredResult};
use crate::model::{
    EccCurve, EccParameters, PublicKey, PublicKeyDescriptor, PublicParameters, RsaParameters,
};

/// Rebuild a standard public key from a module public area
///
/// # Errors
///
/// Returns errors if:
/// - The object is a keyed-hash or symmetric object, or sits on an unsupported curve
/// - The parameters are inconsistent (wrong modulus length, point off the curve)
pub fn public_key_from_descriptor(descriptor: &PublicKeyDescriptor) -> TpmcredResult<PublicKey> {
    match &descriptor.parameters {
        PublicParameters::Rsa(params) => rsa_public_key(params).map(PublicKey::Rsa),
        PublicParameters::Ecc(params) if params.curve == EccCurve::NistP256 => {
            p256_public_key(params).map(PublicKey::EcP256)
        }
        PublicParameters::Ecc(params) => Err(TpmcredError::UnsupportedAlgorithm {
            algorithm: format!("ECC on {}", params.curve),
        }),
        PublicParameters::KeyedHash | PublicParameters::SymCipher => {
            Err(TpmcredError::UnsupportedAlgorithm {
                algorithm: descriptor.algorithm().to_string(),
            })
        }
    }
}

fn malformed(reason: impl Into<String>) -> TpmcredError {
    TpmcredError::ModuleCommunication(ModuleError::MalformedResponse {
        reason: reason.into(),
    })
}

fn rsa_public_key(params: &RsaParameters) -> TpmcredResult<RsaPublicKey> {
    let n = BigUint::from_bytes_be(&params.modulus);
    if n.bits() != usize::from(params.key_bits) {
        return Err(malformed(format!(
            "RSA modulus has {} bits, public area declares {}",
            n.bits(),
            params.key_bits
        )));
    }

    debug!(
        "Rebuilding {}-bit RSA public key, exponent {}",
        params.key_bits,
        params.effective_exponent()
    );
    RsaPublicKey::new(n, BigUint::from(params.effective_exponent()))
        .map_err(|e| malformed(format!("invalid RSA public key: {}", e)))
}

fn p256_public_key(params: &EccParameters) -> TpmcredResult<p256::PublicKey> {
    let size = params.curve.coordinate_size();
    if params.x.len() > size || params.y.len() > size {
        return Err(malformed("ECC coordinate longer than the curve size"));
    }

    // Uncompressed SEC1 point, coordinates left-padded to the field size
    let mut sec1 = Vec::with_capacity(1 + 2 * size);
    sec1.push(0x04);
    for coordinate in [&params.x, &params.y] {
        sec1.resize(sec1.len() + size - coordinate.len(), 0);
        sec1.extend_from_slice(coordinate);
    }

    p256::PublicKey::from_sec1_bytes(&sec1).map_err(|_| malformed("ECC point is not on P-256"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{KeyAlgorithm, ModuleHash, ObjectAttributes};
    use p256::elliptic_curve::sec1::ToEncodedPoint;
    use rsa::traits::PublicKeyParts;

    fn descriptor(parameters: PublicParameters) -> PublicKeyDescriptor {
        PublicKeyDescriptor {
            name_alg: ModuleHash::Sha256,
            attributes: ObjectAttributes::signing_key(),
            parameters,
        }
    }

    fn modulus_1024() -> Vec<u8> {
        let mut modulus = vec![0xC5u8; 128];
        modulus[127] = 0x0B;
        modulus
    }

    #[test]
    fn test_rsa_default_exponent() {
        let desc = descriptor(PublicParameters::Rsa(RsaParameters {
            key_bits: 1024,
            exponent: 0,
            modulus: modulus_1024(),
        }));

        let key = public_key_from_descriptor(&desc).unwrap();
        let rsa = key.as_rsa().unwrap();
        assert_eq!(rsa.e(), &BigUint::from(65537u32));
        assert_eq!(rsa.n().to_bytes_be(), modulus_1024());
    }

    #[test]
    fn test_rsa_explicit_exponent() {
        let desc = descriptor(PublicParameters::Rsa(RsaParameters {
            key_bits: 1024,
            exponent: 3,
            modulus: modulus_1024(),
        }));

        let key = public_key_from_descriptor(&desc).unwrap();
        assert_eq!(key.as_rsa().unwrap().e(), &BigUint::from(3u32));
    }

    #[test]
    fn test_rsa_key_bits_mismatch() {
        let desc = descriptor(PublicParameters::Rsa(RsaParameters {
            key_bits: 2048,
            exponent: 0,
            modulus: modulus_1024(),
        }));

        let result = public_key_from_descriptor(&desc);
        assert!(matches!(
            result,
            Err(TpmcredError::ModuleCommunication(
                ModuleError::MalformedResponse { .. }
            ))
        ));
    }

    #[test]
    fn test_rsa_empty_modulus() {
        let desc = descriptor(PublicParameters::Rsa(RsaParameters {
            key_bits: 2048,
            exponent: 0,
            modulus: Vec::new(),
        }));

        assert!(public_key_from_descriptor(&desc).is_err());
    }

    #[test]
    fn test_p256_point() {
        let secret = p256::SecretKey::random(&mut rand::rngs::OsRng);
        let expected = secret.public_key();
        let point = expected.to_encoded_point(false);

        let desc = descriptor(PublicParameters::Ecc(EccParameters {
            curve: EccCurve::NistP256,
            x: point.x().unwrap().to_vec(),
            y: point.y().unwrap().to_vec(),
        }));

        let key = public_key_from_descriptor(&desc).unwrap();
        assert_eq!(key.algorithm(), KeyAlgorithm::Ecc);
        assert_eq!(key, PublicKey::EcP256(expected));
    }

    #[test]
    fn test_point_not_on_curve() {
        let desc = descriptor(PublicParameters::Ecc(EccParameters {
            curve: EccCurve::NistP256,
            x: vec![1; 32],
            y: vec![2; 32],
        }));

        assert!(matches!(
            public_key_from_descriptor(&desc),
            Err(TpmcredError::ModuleCommunication(
                ModuleError::MalformedResponse { .. }
            ))
        ));
    }

    #[test]
    fn test_unsupported_curve() {
        let desc = descriptor(PublicParameters::Ecc(EccParameters {
            curve: EccCurve::NistP384,
            x: vec![1; 48],
            y: vec![2; 48],
        }));

        let err = public_key_from_descriptor(&desc).unwrap_err();
        assert!(matches!(err, TpmcredError::UnsupportedAlgorithm { .. }));
        assert!(err.to_string().contains("NIST P-384"));
    }

    #[test]
    fn test_symmetric_objects_unsupported() {
        for parameters in [PublicParameters::KeyedHash, PublicParameters::SymCipher] {
            let result = public_key_from_descriptor(&descriptor(parameters));
            assert!(matches!(
                result,
                Err(TpmcredError::UnsupportedAlgorithm { .. })
            ));
        }
    }
}
