use crate::error::{TpmcredError, TpmcredResult};
use crate::model::{ModuleHash, SaltLength, SigScheme, SignOptions};

/// Choose the module signing scheme for caller options and a key of
/// `key_bits`
///
/// PSS when the options carry PSS parameters, PKCS#1 v1.5 otherwise.
///
/// # Errors
///
/// Returns errors if:
/// - The module has no constant for the digest's hash algorithm
///   (`UnsupportedHashAlgorithm`)
/// - An explicit PSS salt length differs from the one the module uses for
///   this key (`UnsupportedSaltLength`)
pub fn select_scheme(opts: &SignOptions, key_bits: usize) -> TpmcredResult<SigScheme> {
    let hash = opts.hash();
    let module_hash =
        ModuleHash::from_hash(hash).ok_or(TpmcredError::UnsupportedHashAlgorithm { hash })?;

    let scheme = SigScheme {
        padding: opts.padding(),
        hash: module_hash,
    };

    if let Some(pss) = opts.pss() {
        let requested = match pss.salt_length {
            SaltLength::Auto => None,
            SaltLength::EqualsHash => Some(module_hash.size()),
            SaltLength::Bytes(n) => Some(n),
        };
        if let Some(requested) = requested {
            if scheme.pss_salt_len(key_bits) != Some(requested) {
                return Err(TpmcredError::UnsupportedSaltLength {
                    requested,
                    scheme,
                    key_bits,
                });
            }
        }
    }

    Ok(scheme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HashAlgorithm, Padding, PssOptions};

    const KEY_BITS: usize = 2048;

    #[test]
    fn test_supported_hashes() {
        let cases = [
            (HashAlgorithm::Sha1, ModuleHash::Sha1),
            (HashAlgorithm::Sha256, ModuleHash::Sha256),
            (HashAlgorithm::Sha384, ModuleHash::Sha384),
            (HashAlgorithm::Sha512, ModuleHash::Sha512),
        ];

        for (hash, expected) in cases {
            let scheme = select_scheme(&SignOptions::Hash(hash), KEY_BITS).unwrap();
            assert_eq!(scheme.hash, expected);
            assert_eq!(scheme.padding, Padding::Pkcs1v15);

            let opts = SignOptions::Pss(PssOptions::new(hash));
            let scheme = select_scheme(&opts, KEY_BITS).unwrap();
            assert_eq!(scheme.hash, expected);
            assert_eq!(scheme.padding, Padding::Pss);
        }
    }

    #[test]
    fn test_every_other_hash_rejected_by_name() {
        let supported = [
            HashAlgorithm::Sha1,
            HashAlgorithm::Sha256,
            HashAlgorithm::Sha384,
            HashAlgorithm::Sha512,
        ];

        for hash in HashAlgorithm::ALL {
            if supported.contains(&hash) {
                continue;
            }
            let err = select_scheme(&SignOptions::Hash(hash), KEY_BITS).unwrap_err();
            assert!(
                matches!(err, TpmcredError::UnsupportedHashAlgorithm { hash: h } if h == hash),
                "unexpected error for {hash}: {err}"
            );
            assert!(err.to_string().contains(hash.name()));
        }
    }

    #[test]
    fn test_pss_with_unsupported_hash() {
        let opts = SignOptions::Pss(PssOptions::new(HashAlgorithm::Sha3_512));
        assert!(matches!(
            select_scheme(&opts, KEY_BITS),
            Err(TpmcredError::UnsupportedHashAlgorithm { .. })
        ));
    }

    #[test]
    fn test_explicit_salt_length_must_match_module() {
        let with_salt = |hash, salt_length| {
            SignOptions::Pss(PssOptions {
                hash,
                salt_length,
            })
        };

        let opts = with_salt(HashAlgorithm::Sha256, SaltLength::Bytes(32));
        assert!(select_scheme(&opts, KEY_BITS).is_ok());
        let opts = with_salt(HashAlgorithm::Sha256, SaltLength::EqualsHash);
        assert!(select_scheme(&opts, KEY_BITS).is_ok());

        let opts = with_salt(HashAlgorithm::Sha256, SaltLength::Bytes(10));
        let err = select_scheme(&opts, KEY_BITS).unwrap_err();
        assert!(matches!(
            err,
            TpmcredError::UnsupportedSaltLength {
                requested: 10,
                key_bits: KEY_BITS,
                ..
            }
        ));
        assert!(err.to_string().contains("RSASSA-PSS/SHA-256"));
    }

    #[test]
    fn test_small_key_caps_salt_length() {
        let auto = SignOptions::Pss(PssOptions::new(HashAlgorithm::Sha512));
        assert!(select_scheme(&auto, 1024).is_ok());

        // A 1024-bit key only leaves room for 62 bytes of salt next to SHA-512
        let exact = SignOptions::Pss(PssOptions {
            hash: HashAlgorithm::Sha512,
            salt_length: SaltLength::EqualsHash,
        });
        assert!(matches!(
            select_scheme(&exact, 1024),
            Err(TpmcredError::UnsupportedSaltLength { requested: 64, .. })
        ));
        let capped = SignOptions::Pss(PssOptions {
            hash: HashAlgorithm::Sha512,
            salt_length: SaltLength::Bytes(62),
        });
        assert!(select_scheme(&capped, 1024).is_ok());
    }
}
