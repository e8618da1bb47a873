//! X.509 client identity for authenticated status pages.
//!
//! The provider is owned by the [`HttpSource`](crate::HttpSource) and therefore
//! only used under the exporter's scrape guard: expiry checks and reloads never
//! race with each other or with a fetch.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use reqwest::Identity;
use tracing::{debug, info, warn};

use scrapewire_common::ScrapeError;

use crate::config::CredentialsConfig;

const ENV_PROXY: &str = "X509_USER_PROXY";
const ENV_CERT: &str = "X509_USER_CERT";
const ENV_KEY: &str = "X509_USER_KEY";

/// PEM material an identity is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialFiles {
    /// A proxy file holding certificate chain and private key.
    Proxy(PathBuf),
    /// Separate certificate and key files.
    CertKey { cert: PathBuf, key: PathBuf },
}

impl CredentialFiles {
    fn load(&self) -> Result<Identity, ScrapeError> {
        let pem = match self {
            CredentialFiles::Proxy(path) => read_pem(path)?,
            CredentialFiles::CertKey { cert, key } => [read_pem(cert)?, read_pem(key)?].concat(),
        };

        Identity::from_pem(&pem).map_err(|e| {
            ScrapeError::MissingCredential(format!("failed to parse {}: {}", self, e))
        })
    }
}

impl std::fmt::Display for CredentialFiles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialFiles::Proxy(path) => write!(f, "proxy {}", path.display()),
            CredentialFiles::CertKey { cert, key } => {
                write!(f, "cert {} key {}", cert.display(), key.display())
            }
        }
    }
}

fn read_pem(path: &Path) -> Result<Vec<u8>, ScrapeError> {
    std::fs::read(path).map_err(|e| {
        ScrapeError::MissingCredential(format!("failed to read {}: {}", path.display(), e))
    })
}

struct CachedIdentity {
    identity: Option<Identity>,
    expires_at: Option<Instant>,
}

/// Supplies a TLS client identity on demand and reloads it after a
/// configurable interval.
///
/// Unless credentials are required, a lookup that finds nothing usable
/// leaves the provider without an identity until the next renewal.
pub struct CredentialProvider {
    config: CredentialsConfig,
    uid_proxy: Option<PathBuf>,
    cached: Option<CachedIdentity>,
}

impl CredentialProvider {
    pub fn new(config: CredentialsConfig) -> Self {
        Self {
            config,
            uid_proxy: default_uid_proxy(),
            cached: None,
        }
    }

    /// Replace the per-user proxy location (`/tmp/x509up_u<uid>`).
    pub fn with_uid_proxy(mut self, path: Option<PathBuf>) -> Self {
        self.uid_proxy = path;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_active()
    }

    /// Whether the cached identity must be (re)loaded before use.
    pub fn is_expired(&self, now: Instant) -> bool {
        match self.cached {
            None => true,
            Some(ref cached) => cached.expires_at.is_some_and(|at| now >= at),
        }
    }

    /// The cached identity, if one is loaded.
    pub fn identity(&self) -> Option<&Identity> {
        self.cached.as_ref().and_then(|c| c.identity.as_ref())
    }

    /// Resolve and load the identity, replacing the cached one.
    pub fn refresh(&mut self, now: Instant) -> Result<Option<&Identity>, ScrapeError> {
        self.refresh_with(now, |name| std::env::var_os(name).map(PathBuf::from))
    }

    fn refresh_with<F>(&mut self, now: Instant, env: F) -> Result<Option<&Identity>, ScrapeError>
    where
        F: Fn(&str) -> Option<PathBuf>,
    {
        let renew_secs = self.config.renew_interval_secs;
        let loaded = self.resolve(env).and_then(|files| {
            let identity = files.load()?;
            info!(credentials = %files, renew_secs, "Loaded client identity");
            Ok(identity)
        });

        let identity = match loaded {
            Ok(identity) => Some(identity),
            Err(e) if !self.config.is_required() => {
                warn!(error = %e, "No client identity, requests go out unauthenticated");
                None
            }
            Err(e) => return Err(e),
        };

        let expires_at = match renew_secs {
            0 => None,
            secs => Some(now + Duration::from_secs(secs)),
        };

        let cached = self.cached.insert(CachedIdentity {
            identity,
            expires_at,
        });
        Ok(cached.identity.as_ref())
    }

    /// Pick the PEM files to load.
    ///
    /// Order: the configured proxy file when present (the per-user proxy
    /// when no proxy file is configured), `$X509_USER_PROXY`, then the
    /// configured cert/key pair or `$X509_USER_CERT` with `$X509_USER_KEY`.
    pub fn resolve<F>(&self, env: F) -> Result<CredentialFiles, ScrapeError>
    where
        F: Fn(&str) -> Option<PathBuf>,
    {
        let existing = |path: &Path| path.exists().then(|| path.to_path_buf());

        let local = match self.config.proxy_file {
            Some(ref path) => existing(path.as_path()),
            None => self.uid_proxy.as_deref().and_then(existing),
        };
        let proxy = local.or_else(|| env(ENV_PROXY));

        if let Some(proxy) = proxy {
            debug!(proxy = %proxy.display(), "Using proxy credentials");
            return Ok(CredentialFiles::Proxy(proxy));
        }

        let cert = self.config.cert_file.clone().or_else(|| env(ENV_CERT));
        let key = self.config.key_file.clone().or_else(|| env(ENV_KEY));

        match (cert, key) {
            (Some(cert), Some(key)) => Ok(CredentialFiles::CertKey { cert, key }),
            _ => Err(ScrapeError::MissingCredential(
                "neither proxy nor user certificate found, set X509_USER_PROXY or X509_USER_CERT/X509_USER_KEY"
                    .to_string(),
            )),
        }
    }
}

impl std::fmt::Debug for CredentialProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialProvider")
            .field("enabled", &self.is_enabled())
            .field("loaded", &self.cached.is_some())
            .finish()
    }
}

#[cfg(unix)]
fn default_uid_proxy() -> Option<PathBuf> {
    use std::os::unix::fs::MetadataExt;

    let uid = std::fs::metadata("/proc/self").ok()?.uid();
    Some(PathBuf::from(format!("/tmp/x509up_u{}", uid)))
}

#[cfg(not(unix))]
fn default_uid_proxy() -> Option<PathBuf> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpExporterConfig;
    use scrapewire_framework::{ExporterArgs, ExporterConfig};
    use tempfile::TempDir;

    fn self_signed(dir: &TempDir) -> (PathBuf, PathBuf) {
        let generated = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        let cert = dir.path().join("usercert.pem");
        let key = dir.path().join("userkey.pem");
        std::fs::write(&cert, generated.cert.pem()).unwrap();
        std::fs::write(&key, generated.signing_key.serialize_pem()).unwrap();
        (cert, key)
    }

    fn provider(config: CredentialsConfig) -> CredentialProvider {
        CredentialProvider::new(CredentialsConfig {
            enabled: Some(true),
            ..config
        })
        .with_uid_proxy(None)
    }

    fn no_env(_: &str) -> Option<PathBuf> {
        None
    }

    #[test]
    fn test_resolve_prefers_configured_proxy() {
        let dir = TempDir::new().unwrap();
        let proxy = dir.path().join("x509up");
        std::fs::write(&proxy, "").unwrap();

        let p = provider(CredentialsConfig {
            proxy_file: Some(proxy.clone()),
            cert_file: Some(dir.path().join("cert.pem")),
            key_file: Some(dir.path().join("key.pem")),
            ..Default::default()
        });

        let env = |name: &str| (name == ENV_PROXY).then(|| PathBuf::from("/env/proxy"));
        assert_eq!(p.resolve(env).unwrap(), CredentialFiles::Proxy(proxy));
    }

    #[test]
    fn test_resolve_uid_proxy_before_env() {
        let dir = TempDir::new().unwrap();
        let uid_proxy = dir.path().join("x509up_u1000");
        std::fs::write(&uid_proxy, "").unwrap();

        let p = provider(CredentialsConfig::default()).with_uid_proxy(Some(uid_proxy.clone()));

        let env = |name: &str| (name == ENV_PROXY).then(|| PathBuf::from("/env/proxy"));
        assert_eq!(p.resolve(env).unwrap(), CredentialFiles::Proxy(uid_proxy));
    }

    #[test]
    fn test_resolve_missing_proxy_file_skips_uid_proxy() {
        let dir = TempDir::new().unwrap();
        let uid_proxy = dir.path().join("x509up_u1000");
        std::fs::write(&uid_proxy, "").unwrap();

        let p = provider(CredentialsConfig {
            proxy_file: Some(dir.path().join("missing")),
            ..Default::default()
        })
        .with_uid_proxy(Some(uid_proxy));

        let env = |name: &str| (name == ENV_PROXY).then(|| PathBuf::from("/env/proxy"));
        assert_eq!(
            p.resolve(env).unwrap(),
            CredentialFiles::Proxy(PathBuf::from("/env/proxy"))
        );

        assert!(matches!(
            p.resolve(no_env),
            Err(ScrapeError::MissingCredential(_))
        ));
    }

    #[test]
    fn test_resolve_env_proxy_then_cert_key() {
        let p = provider(CredentialsConfig::default());

        let env = |name: &str| (name == ENV_PROXY).then(|| PathBuf::from("/env/proxy"));
        assert_eq!(
            p.resolve(env).unwrap(),
            CredentialFiles::Proxy(PathBuf::from("/env/proxy"))
        );

        let env = |name: &str| match name {
            ENV_CERT => Some(PathBuf::from("/env/cert.pem")),
            ENV_KEY => Some(PathBuf::from("/env/key.pem")),
            _ => None,
        };
        assert_eq!(
            p.resolve(env).unwrap(),
            CredentialFiles::CertKey {
                cert: PathBuf::from("/env/cert.pem"),
                key: PathBuf::from("/env/key.pem"),
            }
        );
    }

    #[test]
    fn test_resolve_nothing_is_missing_credential() {
        let p = provider(CredentialsConfig::default());
        assert!(matches!(
            p.resolve(no_env),
            Err(ScrapeError::MissingCredential(_))
        ));
    }

    #[test]
    fn test_default_cli_config_uses_env_proxy() {
        let config = HttpExporterConfig::resolve_with(&ExporterArgs::default(), |c| {
            c.http.uri = "https://cmsweb.example.org/status".to_string();
        })
        .unwrap();

        let p = CredentialProvider::new(config.credentials).with_uid_proxy(None);
        assert!(p.is_enabled());

        let env = |name: &str| (name == ENV_PROXY).then(|| PathBuf::from("/env/x509up"));
        assert_eq!(
            p.resolve(env).unwrap(),
            CredentialFiles::Proxy(PathBuf::from("/env/x509up"))
        );
    }

    #[test]
    fn test_enabled_follows_renew_interval() {
        let auto = CredentialsConfig::default();
        assert!(CredentialProvider::new(auto.clone()).is_enabled());

        let never_renewed = CredentialsConfig {
            renew_interval_secs: 0,
            ..auto.clone()
        };
        assert!(!CredentialProvider::new(never_renewed.clone()).is_enabled());

        let forced = CredentialsConfig {
            enabled: Some(true),
            ..never_renewed
        };
        assert!(CredentialProvider::new(forced).is_enabled());

        let off = CredentialsConfig {
            enabled: Some(false),
            ..auto
        };
        assert!(!CredentialProvider::new(off).is_enabled());
    }

    #[test]
    fn test_refresh_without_identity_when_optional() {
        let mut p = CredentialProvider::new(CredentialsConfig::default()).with_uid_proxy(None);

        let now = Instant::now();
        assert!(p.refresh_with(now, no_env).unwrap().is_none());
        assert!(p.identity().is_none());
        assert!(!p.is_expired(now + Duration::from_secs(599)));
        assert!(p.is_expired(now + Duration::from_secs(600)));
    }

    #[test]
    fn test_refresh_loads_cert_key_pair() {
        let dir = TempDir::new().unwrap();
        let (cert, key) = self_signed(&dir);

        let mut p = provider(CredentialsConfig {
            cert_file: Some(cert),
            key_file: Some(key),
            renew_interval_secs: 60,
            ..Default::default()
        });

        let now = Instant::now();
        assert!(p.is_expired(now));

        assert!(p.refresh_with(now, no_env).unwrap().is_some());

        assert!(p.identity().is_some());
        assert!(!p.is_expired(now + Duration::from_secs(59)));
        assert!(p.is_expired(now + Duration::from_secs(60)));
    }

    #[test]
    fn test_refresh_combined_proxy_never_expires() {
        let dir = TempDir::new().unwrap();
        let (cert, key) = self_signed(&dir);
        let proxy = dir.path().join("x509up");
        let pem = [std::fs::read(cert).unwrap(), std::fs::read(key).unwrap()].concat();
        std::fs::write(&proxy, pem).unwrap();

        let mut p = provider(CredentialsConfig {
            proxy_file: Some(proxy),
            renew_interval_secs: 0,
            ..Default::default()
        });

        let now = Instant::now();
        p.refresh_with(now, no_env).unwrap();
        assert!(!p.is_expired(now + Duration::from_secs(365 * 24 * 3600)));
    }

    #[test]
    fn test_refresh_unreadable_pem() {
        let dir = TempDir::new().unwrap();
        let proxy = dir.path().join("x509up");
        std::fs::write(&proxy, "not a pem file").unwrap();

        let mut p = provider(CredentialsConfig {
            proxy_file: Some(proxy),
            ..Default::default()
        });

        let err = p.refresh_with(Instant::now(), no_env).unwrap_err();
        assert!(matches!(err, ScrapeError::MissingCredential(_)));
        assert!(p.identity().is_none());
    }
}
