use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use std::net::IpAddr;

/// Matches a source or destination address against a network.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NetworkMatch {
    /// A network to match against.
    pub net: IpNet,

    /// Networks to exclude from the match.
    pub except: Vec<IpNet>,
}

// === impl NetworkMatch ===

impl NetworkMatch {
    pub fn matches(&self, addr: IpAddr) -> bool {
        self.net.contains(&addr) && !self.except.iter().any(|n| n.contains(&addr))
    }
}

impl From<IpAddr> for NetworkMatch {
    fn from(net: IpAddr) -> Self {
        IpNet::from(net).into()
    }
}

impl From<IpNet> for NetworkMatch {
    fn from(net: IpNet) -> Self {
        Self {
            net,
            except: vec![],
        }
    }
}

impl From<Ipv4Net> for NetworkMatch {
    fn from(net: Ipv4Net) -> Self {
        IpNet::from(net).into()
    }
}

impl From<Ipv6Net> for NetworkMatch {
    fn from(net: Ipv6Net) -> Self {
        IpNet::from(net).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn contains_with_exceptions() {
        let m = NetworkMatch {
            net: IpNet::from_str("10.0.0.0/8").unwrap(),
            except: vec![IpNet::from_str("10.1.0.0/16").unwrap()],
        };
        assert!(m.matches(IpAddr::from_str("10.2.3.4").unwrap()));
        assert!(!m.matches(IpAddr::from_str("10.1.3.4").unwrap()));
        assert!(!m.matches(IpAddr::from_str("192.168.1.1").unwrap()));
    }
}
