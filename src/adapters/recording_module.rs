//! Recording secure module for testing the signing core
//!
//! Wraps another module, keeps a log of every command it forwards and can
//! be scripted to fail upcoming sign commands. Only available in test scope.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{ModuleError, ModuleResult};
use crate::model::{AuthValue, ModuleHandle, PublicKeyDescriptor, SigScheme};
use crate::ports::{KeyProvisioner, KeyTemplate, SecureModule};

/// A command forwarded to the wrapped module
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ReadPublic(ModuleHandle),
    Sign {
        handle: ModuleHandle,
        digest: Vec<u8>,
        scheme: SigScheme,
    },
    CreatePrimary(ModuleHandle),
    Evict(ModuleHandle),
}

#[derive(Debug)]
pub struct RecordingModule<M> {
    inner: M,
    log: Mutex<Vec<Command>>,
    sign_failures: Mutex<VecDeque<ModuleError>>,
}

impl<M> RecordingModule<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            log: Mutex::new(Vec::new()),
            sign_failures: Mutex::new(VecDeque::new()),
        }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    /// Every command seen so far, oldest first
    pub fn commands(&self) -> Vec<Command> {
        self.log.lock().unwrap().clone()
    }

    pub fn sign_commands(&self) -> Vec<Command> {
        self.commands()
            .into_iter()
            .filter(|command| matches!(command, Command::Sign { .. }))
            .collect()
    }

    /// Make the next sign command fail with `error` without reaching the inner module
    pub fn fail_next_sign(&self, error: ModuleError) {
        self.sign_failures.lock().unwrap().push_back(error);
    }

    fn record(&self, command: Command) {
        self.log.lock().unwrap().push(command);
    }
}

impl<M: SecureModule> SecureModule for RecordingModule<M> {
    fn read_public(&self, handle: ModuleHandle) -> ModuleResult<PublicKeyDescriptor> {
        self.record(Command::ReadPublic(handle));
        self.inner.read_public(handle)
    }

    fn sign(
        &self,
        handle: ModuleHandle,
        auth: &AuthValue,
        digest: &[u8],
        scheme: SigScheme,
    ) -> ModuleResult<Vec<u8>> {
        self.record(Command::Sign {
            handle,
            digest: digest.to_vec(),
            scheme,
        });
        if let Some(error) = self.sign_failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        self.inner.sign(handle, auth, digest, scheme)
    }
}

impl<M: KeyProvisioner> KeyProvisioner for RecordingModule<M> {
    fn create_primary(
        &self,
        handle: ModuleHandle,
        auth: &AuthValue,
        template: &KeyTemplate,
    ) -> ModuleResult<PublicKeyDescriptor> {
        self.record(Command::CreatePrimary(handle));
        self.inner.create_primary(handle, auth, template)
    }

    fn evict(&self, handle: ModuleHandle) -> ModuleResult<()> {
        self.record(Command::Evict(handle));
        self.inner.evict(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::SoftwareModule;
    use crate::contract_tests_for;
    use crate::model::{ModuleHash, Padding};
    use crate::ports::contract_tests::secure_module_contract;

    fn make() -> RecordingModule<SoftwareModule> {
        RecordingModule::new(SoftwareModule::new())
    }

    contract_tests_for!(
        recording_module_contract,
        make = make,
        tests = {
            test_read_public_not_found => secure_module_contract::test_read_public_not_found,
            test_create_primary_rsa => secure_module_contract::test_create_primary_rsa,
            test_create_primary_handle_in_use => secure_module_contract::test_create_primary_handle_in_use,
            test_evict => secure_module_contract::test_evict,
            test_sign_not_found => secure_module_contract::test_sign_not_found,
            test_sign_wrong_auth => secure_module_contract::test_sign_wrong_auth,
            test_sign_non_signing_object => secure_module_contract::test_sign_non_signing_object,
            test_sign_pss_success => secure_module_contract::test_sign_pss_success,
        }
    );

    #[test]
    fn test_records_commands_in_order() {
        let module = make();
        let handle = ModuleHandle::new(0x8100_0001);

        let _ = module.read_public(handle);
        let _ = module.evict(handle);

        assert_eq!(
            module.commands(),
            vec![Command::ReadPublic(handle), Command::Evict(handle)]
        );
        assert!(module.sign_commands().is_empty());
    }

    #[test]
    fn test_scripted_sign_failure_is_consumed_once() {
        let module = make();
        let handle = ModuleHandle::new(0x8100_0001);
        let scheme = SigScheme {
            padding: Padding::Pkcs1v15,
            hash: ModuleHash::Sha256,
        };
        module.fail_next_sign(ModuleError::Channel {
            reason: "busy".to_string(),
        });

        let first = module.sign(handle, &AuthValue::empty(), &[0u8; 32], scheme);
        assert!(matches!(first, Err(ModuleError::Channel { .. })));

        // The second attempt reaches the inner module, which has no key there
        let second = module.sign(handle, &AuthValue::empty(), &[0u8; 32], scheme);
        assert_eq!(second.unwrap_err(), ModuleError::HandleNotFound { handle });
        assert_eq!(module.sign_commands().len(), 2);
    }
}
