use crate::error::Error;
use crate::store::{DynStore, FileStore, MemoryStore};
use ipnetwork::IpNetwork;
use lazy_static::lazy_static;
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::fs::File;
use std::io::BufReader;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub type Shared = Arc<Config>;

/// Certifier configuration, usually loaded from a JSON file with [`Config::try_from_file`].
///
/// Only `root` and `public` are required:
/// ```json
/// {
///   "root": "acme.example.net",
///   "public": "ns.example.net",
///   "dns_udp_bind_addr": "0.0.0.0:53",
///   "serial": 2023031201,
///   "trusted_name_servers": ["1.1.1.1:53"],
///   "store_state_path": "/var/lib/certifier/state.json",
///   "api_bind_addr": "127.0.0.1:3000",
///   "api_timeout": 10
/// }
/// ```
#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    /// The domain Certifier is authoritative for.
    pub root: String,
    /// A domain resolving to this server, served in `NS` and `SOA` answers.
    pub public: String,
    #[serde(default = "default_dns_udp_bind_addr")]
    pub dns_udp_bind_addr: SocketAddr,
    /// The `SOA` serial. Defaults to the current UTC date as `YYYYMMDD`.
    #[serde(default)]
    pub serial: Option<u32>,
    /// Recursive resolvers ACME clients use to check challenge propagation.
    #[serde(default = "default_trusted_name_servers")]
    pub trusted_name_servers: Vec<SocketAddr>,
    /// Persist tenant bindings to this path. Defaults to an in-memory store.
    #[serde(default)]
    pub store_state_path: Option<String>,
    /// Serve the [admin HTTP API][crate::api] on this address. Disabled by default.
    #[serde(default)]
    pub api_bind_addr: Option<SocketAddr>,
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_api_timeout")]
    pub api_timeout: Duration,
}

lazy_static! {
    // NOTE(XXX): Once the "ip" feature has stabilized we can use Ipv6Addr.is_unique_local[0].
    //            Presently this feature is unstable so we home-roll. See also RFC 4193[1].
    // [0]: https://doc.rust-lang.org/std/net/struct.Ipv6Addr.html#method.is_unique_local
    // [1]: https://www.rfc-editor.org/rfc/rfc4193.html
    static ref IPV6_UNIQUE_LOCAL_NETWORK: IpNetwork =
        IpNetwork::from_str("fc00::/7").expect("valid unique local network");
}

/// Public resolvers used for propagation checks when none are configured.
pub const DEFAULT_TRUSTED_NAME_SERVERS: [&str; 4] =
    ["8.8.8.8:53", "8.8.4.4:53", "1.1.1.1:53", "1.0.0.1:53"];

fn default_dns_udp_bind_addr() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 53)
}

fn default_trusted_name_servers() -> Vec<SocketAddr> {
    DEFAULT_TRUSTED_NAME_SERVERS
        .iter()
        .filter_map(|ns| ns.parse().ok())
        .collect()
}

fn default_api_timeout() -> Duration {
    Duration::from_secs(10)
}

impl Config {
    /// A config for `root` and `public` with every other setting at its default.
    pub fn new(root: impl Into<String>, public: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public: public.into(),
            dns_udp_bind_addr: default_dns_udp_bind_addr(),
            serial: None,
            trusted_name_servers: default_trusted_name_servers(),
            store_state_path: None,
            api_bind_addr: None,
            api_timeout: default_api_timeout(),
        }
    }

    /// Load a config from the JSON file at `p`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IO`] or [`Error::InvalidJSON`] if the file can't be read or parsed, and
    /// [`Error::InsecureAPIBind`] if the admin API would listen on a public address.
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let conf: Config = serde_json::from_reader(reader)?;
        conf.bind_addr_is_secure()?;
        Ok(conf)
    }

    /// The store selected by [`Config::store_state_path`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file-backed store state can't be loaded.
    pub async fn store(&self) -> Result<DynStore, Error> {
        match &self.store_state_path {
            Some(path) => {
                tracing::debug!("loading store state from {path}");
                Ok(Arc::new(FileStore::try_from_file(path).await?))
            }
            None => Ok(Arc::new(MemoryStore::new())),
        }
    }

    fn bind_addr_is_secure(&self) -> Result<(), Error> {
        match self.api_bind_addr {
            None => Ok(()),
            Some(SocketAddr::V4(v4_addr)) => {
                let ip = v4_addr.ip();
                if !ip.is_loopback() && !ip.is_private() {
                    return Err(Error::InsecureAPIBind(IpAddr::V4(*ip)));
                }
                Ok(())
            }
            Some(SocketAddr::V6(v6_addr)) => {
                let ip = v6_addr.ip();
                if !ip.is_loopback() && !IPV6_UNIQUE_LOCAL_NETWORK.contains(IpAddr::V6(*ip)) {
                    return Err(Error::InsecureAPIBind(IpAddr::V6(*ip)));
                }
                Ok(())
            }
        }
    }
}
