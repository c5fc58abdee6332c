//! Provision key use case
//!
//! Creates an RSA key inside the module and opens a credential for it.

use std::sync::Arc;

use tracing::info;

use crate::credential::RsaModuleKey;
use crate::error::{TpmcredError, TpmcredResult};
use crate::model::{AuthValue, ModuleHandle};
use crate::ports::{KeyProvisioner, KeyTemplate, SecureModule, TemplateAlgorithm};

/// Create an RSA primary key at `handle` and wrap it as a credential
///
/// The credential is built through the normal read-public path, so its
/// public key reflects what the module reports rather than the create reply.
///
/// # Errors
///
/// Returns errors if:
/// - `template` does not describe an RSA key (`UnsupportedAlgorithm`)
/// - The handle is occupied or key creation fails (`ModuleCommunication`)
pub fn provision_rsa_key<M>(
    module: Arc<M>,
    handle: ModuleHandle,
    auth: AuthValue,
    template: &KeyTemplate,
) -> TpmcredResult<RsaModuleKey<M>>
where
    M: SecureModule + KeyProvisioner,
{
    if !matches!(template.algorithm, TemplateAlgorithm::Rsa { .. }) {
        return Err(TpmcredError::UnsupportedAlgorithm {
            algorithm: format!("{:?} template for an RSA credential", template.algorithm),
        });
    }

    module.create_primary(handle, &auth, template)?;
    info!("Provisioned RSA key at handle {}", handle);

    RsaModuleKey::new(module, handle, auth)
}
