//! MQTT broker address parsing.

use url::Url;

/// Parse a broker URL into host and port.
///
/// Accepts `tcp://host:port`, `mqtt://host:port`, and bare `host[:port]`;
/// the port defaults to 1883.
///
/// # Errors
///
/// Returns error for unsupported schemes, missing hosts, or invalid ports.
pub fn parse_broker_url(input: &str) -> Result<(String, u16), BrokerUrlError> {
    if input.contains("://") {
        let url = Url::parse(input)
            .map_err(|e| BrokerUrlError::Invalid(format!("{input}: {e}")))?;

        match url.scheme() {
            "tcp" | "mqtt" => {}
            scheme => {
                return Err(BrokerUrlError::Invalid(format!(
                    "{input}: unsupported scheme '{scheme}'"
                )));
            }
        }

        let host = url
            .host_str()
            .ok_or_else(|| BrokerUrlError::Invalid(format!("{input}: missing host")))?;
        let port = url.port().unwrap_or(1883);

        return Ok((host.to_string(), port));
    }

    let mut parts = input.split(':');
    let host = parts
        .next()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| BrokerUrlError::Invalid(format!("{input}: missing host")))?;
    let port = match parts.next() {
        None => 1883,
        Some(port) => port
            .parse()
            .map_err(|_| BrokerUrlError::Invalid(format!("{input}: invalid port '{port}'")))?,
    };
    if parts.next().is_some() {
        return Err(BrokerUrlError::Invalid(format!(
            "{input}: too many ':' separators"
        )));
    }

    Ok((host.to_string(), port))
}

/// Errors produced by broker URL parsing.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BrokerUrlError {
    /// The URL could not be interpreted
    #[error("invalid MQTT broker URL: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tcp_url() {
        let (host, port) = parse_broker_url("tcp://localhost:1883").unwrap();
        assert_eq!(host, "localhost");
        assert_eq!(port, 1883);
    }

    #[test]
    fn default_port_applies() {
        let (host, port) = parse_broker_url("mqtt://broker.example.com").unwrap();
        assert_eq!(host, "broker.example.com");
        assert_eq!(port, 1883);
    }

    #[test]
    fn bare_host_port_accepted() {
        let (host, port) = parse_broker_url("192.168.7.1:1884").unwrap();
        assert_eq!(host, "192.168.7.1");
        assert_eq!(port, 1884);
    }

    #[test]
    fn rejects_other_schemes() {
        assert!(parse_broker_url("ws://localhost:9001").is_err());
    }

    #[test]
    fn rejects_invalid_port() {
        assert!(parse_broker_url("localhost:abc").is_err());
    }
}
