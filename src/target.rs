use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use url::{Host, Url};

use crate::{DsaError, Result};

/// An http(s) URL that does not name a private-network host literal.
///
/// Host names are not resolved here; DNS-level policy belongs to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VettedUrl(Url);

impl VettedUrl {
    pub fn parse(value: &str) -> Result<Self> {
        let url = Url::parse(value.trim())?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DsaError::load(format!(
                "unsupported scheme '{}'; only http and https pages can be audited",
                url.scheme()
            )));
        }
        match url.host() {
            None => return Err(DsaError::load("URL has no host")),
            Some(Host::Domain(domain)) => {
                let lower = domain.to_ascii_lowercase();
                if lower == "localhost" || lower.ends_with(".localhost") || lower.ends_with(".local")
                {
                    return Err(private_network(domain));
                }
            }
            Some(Host::Ipv4(ip)) => {
                if is_private_v4(ip) {
                    return Err(private_network(&ip.to_string()));
                }
            }
            Some(Host::Ipv6(ip)) => {
                if is_private_v6(ip) {
                    return Err(private_network(&ip.to_string()));
                }
            }
        }
        Ok(Self(url))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for VettedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

fn private_network(host: &str) -> DsaError {
    DsaError::load(format!("host {} is on a private network", host))
}

fn is_private_v4(ip: Ipv4Addr) -> bool {
    let [a, b, ..] = ip.octets();
    ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
        // 100.64.0.0/10 carrier-grade NAT
        || (a == 100 && (64..=127).contains(&b))
}

fn is_private_v6(ip: Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_private_v4(v4);
    }
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        // fc00::/7 unique local
        || (first & 0xfe00) == 0xfc00
        // fe80::/10 link local
        || (first & 0xffc0) == 0xfe80
}
