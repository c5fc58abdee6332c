#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use rand::rngs::OsRng;
use rsa::RsaPrivateKey;

use tpmcred::adapters::SoftwareModule;
use tpmcred::api::{AuthValue, ModuleHandle, ObjectAttributes, PublicKeyDescriptor, SigScheme};
use tpmcred::{ModuleError, ModuleResult, RsaModuleKey, SecureModule};

pub const CA_HANDLE: ModuleHandle = ModuleHandle::new(0x8100_0100);
pub const SERVER_HANDLE: ModuleHandle = ModuleHandle::new(0x8100_0101);
pub const CLIENT_HANDLE: ModuleHandle = ModuleHandle::new(0x8100_0102);

/// Three 2048-bit keys, generated once per test binary
pub fn fixture_keys() -> &'static [RsaPrivateKey; 3] {
    static KEYS: OnceLock<[RsaPrivateKey; 3]> = OnceLock::new();
    KEYS.get_or_init(|| {
        let generate = || RsaPrivateKey::new(&mut OsRng, 2048).expect("key generation failed");
        [generate(), generate(), generate()]
    })
}

pub fn auth() -> AuthValue {
    AuthValue::from_str("integration-secret").unwrap()
}

/// Software module with fixture key `index` loaded at `handle`
pub fn load_fixture(module: &SoftwareModule, handle: ModuleHandle, index: usize) {
    module
        .load_external(
            handle,
            &auth(),
            fixture_keys()[index].clone(),
            ObjectAttributes::signing_key(),
        )
        .expect("load external failed");
}

pub fn rsa_credential() -> RsaModuleKey<SoftwareModule> {
    let module = SoftwareModule::new();
    load_fixture(&module, SERVER_HANDLE, 1);
    RsaModuleKey::new(Arc::new(module), SERVER_HANDLE, auth()).expect("credential")
}

/// Module whose next `failures` sign commands fail with a channel error
pub struct FlakyModule {
    pub inner: SoftwareModule,
    failures: AtomicUsize,
}

impl FlakyModule {
    pub fn new(inner: SoftwareModule, failures: usize) -> Self {
        Self {
            inner,
            failures: AtomicUsize::new(failures),
        }
    }
}

impl SecureModule for FlakyModule {
    fn read_public(&self, handle: ModuleHandle) -> ModuleResult<PublicKeyDescriptor> {
        self.inner.read_public(handle)
    }

    fn sign(
        &self,
        handle: ModuleHandle,
        auth: &AuthValue,
        digest: &[u8],
        scheme: SigScheme,
    ) -> ModuleResult<Vec<u8>> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(ModuleError::Channel {
                reason: "transport busy".to_string(),
            });
        }
        self.inner.sign(handle, auth, digest, scheme)
    }
}
