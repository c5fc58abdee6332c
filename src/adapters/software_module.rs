//! Software implementation of the secure module
//!
//! Keeps key material in process memory and answers the same commands a
//! hardware module would, including authorization checks and
//! dictionary-attack lockout. Meant for tests, demos and CI machines without
//! a module; it offers none of the isolation a real module provides.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

use p256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, Pkcs1v15Sign, Pss, RsaPrivateKey};
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};
use tracing::{debug, info};

use crate::error::{ModuleError, ModuleResult};
use crate::model::{
    AuthValue, EccCurve, EccParameters, ModuleHandle, ModuleHash, ObjectAttributes, Padding,
    PublicKeyDescriptor, PublicParameters, RsaParameters, SigScheme,
};
use crate::ports::{KeyProvisioner, KeyTemplate, SecureModule, TemplateAlgorithm};

/// Configuration for a [`SoftwareModule`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftwareModuleConfig {
    /// Consecutive authorization failures before lockout; zero disables lockout
    pub max_auth_failures: u32,
}

impl Default for SoftwareModuleConfig {
    fn default() -> Self {
        Self {
            max_auth_failures: 3,
        }
    }
}

// Private material is kept for RSA only, the one family the module signs with
enum KeyMaterial {
    Rsa(RsaPrivateKey),
    Ecc { curve: EccCurve },
    KeyedHash,
}

impl fmt::Display for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyMaterial::Rsa(key) => write!(f, "a {}-bit RSA key", key.n().bits()),
            KeyMaterial::Ecc { curve } => write!(f, "an ECC {} key", curve),
            KeyMaterial::KeyedHash => f.write_str("a keyed-hash object"),
        }
    }
}

struct ModuleObject {
    material: KeyMaterial,
    auth: AuthValue,
    public: PublicKeyDescriptor,
}

#[derive(Default)]
struct ModuleState {
    objects: HashMap<ModuleHandle, ModuleObject>,
    failed_auths: u32,
    commands: u64,
}

/// In-process secure module
///
/// Commands are serialized through an internal mutex, so one instance can be
/// shared between threads behind an `Arc`.
pub struct SoftwareModule {
    config: SoftwareModuleConfig,
    state: Mutex<ModuleState>,
}

impl SoftwareModule {
    pub fn new() -> Self {
        Self::with_config(SoftwareModuleConfig::default())
    }

    pub fn with_config(config: SoftwareModuleConfig) -> Self {
        Self {
            config,
            state: Mutex::new(ModuleState::default()),
        }
    }

    /// Load existing RSA key material at `handle`
    ///
    /// # Errors
    ///
    /// Returns `ModuleError::HandleInUse` if `handle` is occupied
    pub fn load_external(
        &self,
        handle: ModuleHandle,
        auth: &AuthValue,
        key: RsaPrivateKey,
        attributes: ObjectAttributes,
    ) -> ModuleResult<PublicKeyDescriptor> {
        let mut state = self.state()?;
        state.commands += 1;
        if state.objects.contains_key(&handle) {
            return Err(ModuleError::HandleInUse { handle });
        }

        let exponent = exponent_to_u32(key.e())?;
        let public = rsa_descriptor(&key, exponent, ModuleHash::Sha256, attributes)?;
        state.objects.insert(
            handle,
            ModuleObject {
                material: KeyMaterial::Rsa(key),
                auth: auth.clone(),
                public: public.clone(),
            },
        );

        info!("Loaded external RSA key at handle {}", handle);
        Ok(public)
    }

    /// Clear the authorization failure counter
    pub fn reset_lockout(&self) -> ModuleResult<()> {
        let mut state = self.state()?;
        state.failed_auths = 0;
        debug!("Lockout counter reset");
        Ok(())
    }

    pub fn is_locked_out(&self) -> bool {
        self.state()
            .map(|state| self.locked_out(&state))
            .unwrap_or(false)
    }

    /// Number of commands executed so far
    pub fn command_count(&self) -> u64 {
        self.state().map(|state| state.commands).unwrap_or(0)
    }

    fn state(&self) -> ModuleResult<MutexGuard<'_, ModuleState>> {
        self.state.lock().map_err(|_| ModuleError::Channel {
            reason: "module state lock poisoned".to_string(),
        })
    }

    fn locked_out(&self, state: &ModuleState) -> bool {
        self.config.max_auth_failures > 0 && state.failed_auths >= self.config.max_auth_failures
    }

    fn authorize(
        &self,
        state: &mut ModuleState,
        handle: ModuleHandle,
        auth: &AuthValue,
    ) -> ModuleResult<()> {
        if self.locked_out(state) {
            return Err(ModuleError::Lockout);
        }

        let object = state
            .objects
            .get(&handle)
            .ok_or(ModuleError::HandleNotFound { handle })?;

        if !object.public.attributes.user_with_auth {
            return Err(ModuleError::Attributes {
                handle,
                operation: "password authorization".to_string(),
            });
        }

        if object.auth.matches(auth) {
            state.failed_auths = 0;
            Ok(())
        } else {
            state.failed_auths += 1;
            debug!(
                "Authorization failed for handle {} ({} consecutive failures)",
                handle, state.failed_auths
            );
            Err(ModuleError::AuthFailure { handle })
        }
    }
}

impl Default for SoftwareModule {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SoftwareModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let objects = self.state().map(|state| state.objects.len()).unwrap_or(0);
        f.debug_struct("SoftwareModule")
            .field("config", &self.config)
            .field("objects", &objects)
            .finish()
    }
}

impl SecureModule for SoftwareModule {
    fn read_public(&self, handle: ModuleHandle) -> ModuleResult<PublicKeyDescriptor> {
        let mut state = self.state()?;
        state.commands += 1;

        debug!("ReadPublic for handle {}", handle);
        state
            .objects
            .get(&handle)
            .map(|object| object.public.clone())
            .ok_or(ModuleError::HandleNotFound { handle })
    }

    fn sign(
        &self,
        handle: ModuleHandle,
        auth: &AuthValue,
        digest: &[u8],
        scheme: SigScheme,
    ) -> ModuleResult<Vec<u8>> {
        let mut state = self.state()?;
        state.commands += 1;

        let object = state
            .objects
            .get(&handle)
            .ok_or(ModuleError::HandleNotFound { handle })?;
        if !object.public.attributes.sign {
            return Err(ModuleError::Attributes {
                handle,
                operation: "signing".to_string(),
            });
        }
        if !matches!(object.material, KeyMaterial::Rsa(_)) {
            return Err(ModuleError::Scheme {
                reason: format!(
                    "{} requires an RSA key, handle {} holds {}",
                    scheme, handle, object.material
                ),
            });
        }

        self.authorize(&mut state, handle, auth)?;

        if digest.len() != scheme.hash.size() {
            return Err(ModuleError::DigestSize {
                expected: scheme.hash.size(),
                actual: digest.len(),
            });
        }

        let key = match state.objects.get(&handle).map(|object| &object.material) {
            Some(KeyMaterial::Rsa(key)) => key,
            _ => return Err(ModuleError::HandleNotFound { handle }),
        };

        debug!("Sign with handle {} using {}", handle, scheme);
        rsa_sign(key, digest, scheme)
    }
}

impl KeyProvisioner for SoftwareModule {
    fn create_primary(
        &self,
        handle: ModuleHandle,
        auth: &AuthValue,
        template: &KeyTemplate,
    ) -> ModuleResult<PublicKeyDescriptor> {
        let mut state = self.state()?;
        state.commands += 1;
        if state.objects.contains_key(&handle) {
            return Err(ModuleError::HandleInUse { handle });
        }

        let (material, public) = match template.algorithm {
            TemplateAlgorithm::Rsa { key_bits, exponent } => {
                if !matches!(key_bits, 1024 | 2048 | 3072 | 4096) {
                    return Err(ModuleError::Parameters {
                        reason: format!("unsupported RSA key size {}", key_bits),
                    });
                }
                let effective = if exponent == 0 {
                    RsaParameters::DEFAULT_EXPONENT
                } else {
                    exponent
                };
                if effective < 3 || effective % 2 == 0 {
                    return Err(ModuleError::Parameters {
                        reason: format!("invalid RSA exponent {}", exponent),
                    });
                }

                debug!("Generating {}-bit RSA key", key_bits);
                let key = RsaPrivateKey::new_with_exp(
                    &mut OsRng,
                    usize::from(key_bits),
                    &BigUint::from(effective),
                )
                .map_err(|e| ModuleError::CommandFailed {
                    reason: format!("RSA key generation failed: {}", e),
                })?;
                let public =
                    rsa_descriptor(&key, exponent, template.name_alg, template.attributes)?;
                (KeyMaterial::Rsa(key), public)
            }
            TemplateAlgorithm::Ecc { curve } => {
                if curve != EccCurve::NistP256 {
                    return Err(ModuleError::Parameters {
                        reason: format!("unsupported curve {}", curve),
                    });
                }
                let secret = p256::SecretKey::random(&mut OsRng);
                let point = secret.public_key().to_encoded_point(false);
                let (x, y) = match (point.x(), point.y()) {
                    (Some(x), Some(y)) => (x.to_vec(), y.to_vec()),
                    _ => {
                        return Err(ModuleError::CommandFailed {
                            reason: "generated point has no affine coordinates".to_string(),
                        })
                    }
                };
                let public = PublicKeyDescriptor {
                    name_alg: template.name_alg,
                    attributes: template.attributes,
                    parameters: PublicParameters::Ecc(EccParameters { curve, x, y }),
                };
                (KeyMaterial::Ecc { curve }, public)
            }
            TemplateAlgorithm::KeyedHash => {
                let public = PublicKeyDescriptor {
                    name_alg: template.name_alg,
                    attributes: template.attributes,
                    parameters: PublicParameters::KeyedHash,
                };
                (KeyMaterial::KeyedHash, public)
            }
        };

        state.objects.insert(
            handle,
            ModuleObject {
                material,
                auth: auth.clone(),
                public: public.clone(),
            },
        );

        info!(
            "Created {} primary key at handle {}",
            public.algorithm(),
            handle
        );
        Ok(public)
    }

    fn evict(&self, handle: ModuleHandle) -> ModuleResult<()> {
        let mut state = self.state()?;
        state.commands += 1;
        state
            .objects
            .remove(&handle)
            .map(|_| info!("Evicted handle {}", handle))
            .ok_or(ModuleError::HandleNotFound { handle })
    }
}

fn rsa_descriptor(
    key: &RsaPrivateKey,
    exponent: u32,
    name_alg: ModuleHash,
    attributes: ObjectAttributes,
) -> ModuleResult<PublicKeyDescriptor> {
    let key_bits = modulus_bits(key.n().bits())?;
    let exponent = if exponent == RsaParameters::DEFAULT_EXPONENT {
        0
    } else {
        exponent
    };
    Ok(PublicKeyDescriptor {
        name_alg,
        attributes,
        parameters: PublicParameters::Rsa(RsaParameters {
            key_bits,
            exponent,
            modulus: key.n().to_bytes_be(),
        }),
    })
}

fn modulus_bits(bits: usize) -> ModuleResult<u16> {
    u16::try_from(bits).map_err(|_| ModuleError::Parameters {
        reason: format!("RSA modulus of {} bits is too large", bits),
    })
}

fn exponent_to_u32(e: &BigUint) -> ModuleResult<u32> {
    let bytes = e.to_bytes_be();
    if bytes.len() > 4 {
        return Err(ModuleError::Parameters {
            reason: "RSA exponent does not fit in 32 bits".to_string(),
        });
    }
    Ok(bytes.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b)))
}

fn rsa_sign(key: &RsaPrivateKey, digest: &[u8], scheme: SigScheme) -> ModuleResult<Vec<u8>> {
    let key_bits = key.n().bits();
    let salt = match scheme.padding {
        Padding::Pkcs1v15 => 0,
        Padding::Pss => scheme
            .pss_salt_len(key_bits)
            .ok_or_else(|| ModuleError::Scheme {
                reason: format!("{} does not fit a {}-bit key", scheme, key_bits),
            })?,
    };

    let result = match (scheme.padding, scheme.hash) {
        (Padding::Pkcs1v15, ModuleHash::Sha1) => key.sign(Pkcs1v15Sign::new::<Sha1>(), digest),
        (Padding::Pkcs1v15, ModuleHash::Sha256) => key.sign(Pkcs1v15Sign::new::<Sha256>(), digest),
        (Padding::Pkcs1v15, ModuleHash::Sha384) => key.sign(Pkcs1v15Sign::new::<Sha384>(), digest),
        (Padding::Pkcs1v15, ModuleHash::Sha512) => key.sign(Pkcs1v15Sign::new::<Sha512>(), digest),
        (Padding::Pss, ModuleHash::Sha1) => {
            key.sign_with_rng(&mut OsRng, Pss::new_with_salt::<Sha1>(salt), digest)
        }
        (Padding::Pss, ModuleHash::Sha256) => {
            key.sign_with_rng(&mut OsRng, Pss::new_with_salt::<Sha256>(salt), digest)
        }
        (Padding::Pss, ModuleHash::Sha384) => {
            key.sign_with_rng(&mut OsRng, Pss::new_with_salt::<Sha384>(salt), digest)
        }
        (Padding::Pss, ModuleHash::Sha512) => {
            key.sign_with_rng(&mut OsRng, Pss::new_with_salt::<Sha512>(salt), digest)
        }
    };

    result.map_err(|e| ModuleError::CommandFailed {
        reason: format!("{} signing failed: {}", scheme, e),
    })
}
