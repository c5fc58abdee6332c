use std::io::{Read, Write};
use std::net::{IpAddr, Ipv4Addr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Sign, Pss, RsaPublicKey};
use rustls::pki_types::{CertificateDer, ServerName};
use rustls::{ClientConnection, ServerConnection, StreamOwned};
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};
use tracing::{error, info};
use x509_cert::der::Encode;

use tpmcred::adapters::{
    certified_key, client_config, server_config, ModuleCertSigner, SoftwareModule,
    SoftwareModuleConfig,
};
use tpmcred::api::{
    AuthValue, HashAlgorithm, ModuleHandle, PssOptions, PublicParameters, SignOptions,
};
use tpmcred::use_cases::{
    issue_ca_certificate, issue_leaf_certificate, provision_rsa_key, LeafRequest,
};
use tpmcred::{select_scheme, KeyTemplate, RsaModuleKey, SigningCredential};

const KEY_HANDLE: ModuleHandle = ModuleHandle::new(0x8100_0001);
const CA_HANDLE: ModuleHandle = ModuleHandle::new(0x8100_0010);
const SERVER_HANDLE: ModuleHandle = ModuleHandle::new(0x8100_0011);
const CLIENT_HANDLE: ModuleHandle = ModuleHandle::new(0x8100_0012);

const DEMO_REQUEST: &[u8] = b"ping from module-backed client";
const DEMO_RESPONSE: &[u8] = b"pong from module-backed server";

#[derive(Parser, Debug)]
#[command(name = "tpmcred")]
#[command(about = "Sign with RSA keys that never leave the secure module", version)]
pub struct Cli {
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Consecutive authorization failures before the module locks out (0 disables)
    #[arg(long, global = true, default_value_t = 3)]
    pub max_auth_failures: u32,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Provision a key and print its public area
    Info {
        /// RSA key size in bits (1024, 2048, 3072 or 4096)
        #[arg(long, default_value_t = 2048)]
        bits: u16,
    },

    /// Sign a precomputed digest and verify the result
    Sign {
        /// Hash algorithm the digest was computed with
        #[arg(long, default_value = "sha256")]
        hash: HashArg,

        /// Use RSASSA-PSS instead of PKCS#1 v1.5
        #[arg(long)]
        pss: bool,

        /// Digest in hex
        #[arg(long)]
        digest: String,

        /// RSA key size in bits
        #[arg(long, default_value_t = 2048)]
        bits: u16,
    },

    /// Run a mutual-TLS exchange where both peers sign inside the module
    TlsDemo,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum HashArg {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl From<HashArg> for HashAlgorithm {
    fn from(arg: HashArg) -> Self {
        match arg {
            HashArg::Sha1 => HashAlgorithm::Sha1,
            HashArg::Sha256 => HashAlgorithm::Sha256,
            HashArg::Sha384 => HashAlgorithm::Sha384,
            HashArg::Sha512 => HashAlgorithm::Sha512,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    let module = Arc::new(SoftwareModule::with_config(SoftwareModuleConfig {
        max_auth_failures: cli.max_auth_failures,
    }));

    let result = match cli.command {
        Commands::Info { bits } => info_command(module, bits),
        Commands::Sign {
            hash,
            pss,
            digest,
            bits,
        } => sign_command(module, hash, pss, &digest, bits),
        Commands::TlsDemo => tls_demo(module),
    };

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}

fn info_command(module: Arc<SoftwareModule>, bits: u16) -> anyhow::Result<()> {
    let key = provision_rsa_key(module, KEY_HANDLE, AuthValue::empty(), &KeyTemplate::rsa(bits))
        .context("failed to provision key")?;
    let descriptor = key.descriptor();

    println!("handle:     {}", key.handle());
    println!("algorithm:  {}", descriptor.algorithm());
    println!("name alg:   {}", descriptor.name_alg);
    println!("attributes: {:#010x}", descriptor.attributes.bits());
    if let PublicParameters::Rsa(params) = &descriptor.parameters {
        println!("key bits:   {}", params.key_bits);
        println!("exponent:   {}", params.effective_exponent());
    }
    println!("spki:       {}", hex::encode(key.public().to_spki_der()?));
    Ok(())
}

fn sign_command(
    module: Arc<SoftwareModule>,
    hash: HashArg,
    pss: bool,
    digest_hex: &str,
    bits: u16,
) -> anyhow::Result<()> {
    let digest = hex::decode(digest_hex).map_err(|e| anyhow!("Invalid digest hex: {}", e))?;
    let key = provision_rsa_key(module, KEY_HANDLE, AuthValue::empty(), &KeyTemplate::rsa(bits))
        .context("failed to provision key")?;

    let opts = if pss {
        SignOptions::Pss(PssOptions::new(hash.into()))
    } else {
        SignOptions::Hash(hash.into())
    };
    let signature = key
        .sign(None, &digest, &opts)
        .context("module refused to sign")?;

    let key_bits = key.rsa_public_key().n().bits();
    let salt = if pss {
        let scheme = select_scheme(&opts, key_bits)?;
        let salt = scheme
            .pss_salt_len(key_bits)
            .ok_or_else(|| anyhow!("{} does not fit a {}-bit key", scheme, key_bits))?;
        Some(salt)
    } else {
        None
    };
    verify(key.rsa_public_key(), hash, salt, &digest, &signature)
        .map_err(|e| anyhow!("signature does not verify: {}", e))?;
    info!("Signature verified against the module public key");

    println!("{}", hex::encode(signature));
    Ok(())
}

/// PKCS#1 v1.5 when `pss_salt` is `None`
fn verify(
    public_key: &RsaPublicKey,
    hash: HashArg,
    pss_salt: Option<usize>,
    digest: &[u8],
    signature: &[u8],
) -> rsa::Result<()> {
    match (hash, pss_salt) {
        (HashArg::Sha1, None) => public_key.verify(Pkcs1v15Sign::new::<Sha1>(), digest, signature),
        (HashArg::Sha256, None) => {
            public_key.verify(Pkcs1v15Sign::new::<Sha256>(), digest, signature)
        }
        (HashArg::Sha384, None) => {
            public_key.verify(Pkcs1v15Sign::new::<Sha384>(), digest, signature)
        }
        (HashArg::Sha512, None) => {
            public_key.verify(Pkcs1v15Sign::new::<Sha512>(), digest, signature)
        }
        (HashArg::Sha1, Some(salt)) => {
            public_key.verify(Pss::new_with_salt::<Sha1>(salt), digest, signature)
        }
        (HashArg::Sha256, Some(salt)) => {
            public_key.verify(Pss::new_with_salt::<Sha256>(salt), digest, signature)
        }
        (HashArg::Sha384, Some(salt)) => {
            public_key.verify(Pss::new_with_salt::<Sha384>(salt), digest, signature)
        }
        (HashArg::Sha512, Some(salt)) => {
            public_key.verify(Pss::new_with_salt::<Sha512>(salt), digest, signature)
        }
    }
}

fn leaf_chain(
    ca_signer: &ModuleCertSigner<RsaModuleKey<SoftwareModule>>,
    ca_certificate: &x509_cert::Certificate,
    key: &RsaModuleKey<SoftwareModule>,
    request: &LeafRequest,
) -> anyhow::Result<Vec<CertificateDer<'static>>> {
    let leaf = issue_leaf_certificate(ca_signer, ca_certificate, key.public(), request)?;
    Ok(vec![
        CertificateDer::from(leaf.to_der()?),
        CertificateDer::from(ca_certificate.to_der()?),
    ])
}

fn tls_demo(module: Arc<SoftwareModule>) -> anyhow::Result<()> {
    let provision = |handle| {
        provision_rsa_key(
            Arc::clone(&module),
            handle,
            AuthValue::empty(),
            &KeyTemplate::default(),
        )
    };
    let ca_key = provision(CA_HANDLE)?;
    let server_key = provision(SERVER_HANDLE)?;
    let client_key = provision(CLIENT_HANDLE)?;

    let ca_signer = ModuleCertSigner::new(Arc::new(ca_key))?;
    let ca_certificate =
        issue_ca_certificate(&ca_signer, "tpmcred demo CA", Duration::from_secs(3600))?;
    let ca_der = CertificateDer::from(ca_certificate.to_der()?);

    let server_request = LeafRequest {
        dns_names: vec!["localhost".to_string()],
        ip_addresses: vec![IpAddr::V4(Ipv4Addr::LOCALHOST)],
        ..LeafRequest::new("tpmcred demo server")
    };
    let server_chain = leaf_chain(&ca_signer, &ca_certificate, &server_key, &server_request)?;
    let client_chain = leaf_chain(
        &ca_signer,
        &ca_certificate,
        &client_key,
        &LeafRequest::new("tpmcred demo client"),
    )?;

    let server_config = Arc::new(server_config(
        ca_der.clone(),
        certified_key(server_chain, Arc::new(server_key))?,
    )?);
    let client_config = Arc::new(client_config(
        ca_der,
        certified_key(client_chain, Arc::new(client_key))?,
    )?);

    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))?;
    let addr = listener.local_addr()?;
    info!("Demo server listening on {}", addr);

    let server = thread::spawn(move || -> anyhow::Result<Vec<u8>> {
        let (stream, peer) = listener.accept()?;
        info!("Accepted connection from {}", peer);
        let mut tls = StreamOwned::new(ServerConnection::new(server_config)?, stream);

        let mut request = vec![0u8; DEMO_REQUEST.len()];
        tls.read_exact(&mut request)?;
        tls.write_all(DEMO_RESPONSE)?;
        tls.conn.send_close_notify();
        tls.flush()?;
        Ok(request)
    });

    let server_name = ServerName::try_from("localhost")?;
    let connection = ClientConnection::new(client_config, server_name)?;
    let mut tls = StreamOwned::new(connection, TcpStream::connect(addr)?);
    tls.write_all(DEMO_REQUEST)?;
    let mut response = Vec::new();
    tls.read_to_end(&mut response)?;

    let request = server
        .join()
        .map_err(|_| anyhow!("demo server thread panicked"))??;

    println!("client sent:     {}", String::from_utf8_lossy(&request));
    println!("server answered: {}", String::from_utf8_lossy(&response));
    println!("module commands: {}", module.command_count());

    if response != DEMO_RESPONSE {
        return Err(anyhow!("server response was altered in transit"));
    }
    Ok(())
}
