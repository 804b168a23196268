use std::time::Duration;

use log::debug;
use tokio::net::TcpStream;
use tokio::time::timeout;
use url::Url;

use super::FailureKind;

/// DNS + TCP pre-flight check against the URL's host and port
pub async fn probe(url: &str, limit: Duration) -> Result<(), FailureKind> {
    let parsed = Url::parse(url).map_err(|e| FailureKind::Rejected(format!("invalid URL: {e}")))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| FailureKind::Rejected("URL has no host".to_string()))?;
    let port = parsed
        .port_or_known_default()
        .ok_or_else(|| FailureKind::Rejected("URL has no port".to_string()))?;

    // IPv6 literals come back bracketed from host_str
    let host = host.trim_start_matches('[').trim_end_matches(']');

    debug!("Testing connectivity to {}:{}", host, port);
    match timeout(limit, TcpStream::connect((host, port))).await {
        Ok(Ok(_)) => {
            debug!("Connectivity test passed");
            Ok(())
        }
        Ok(Err(e)) => {
            debug!("Connectivity test failed: {}", e);
            Err(FailureKind::Connection)
        }
        Err(_) => {
            debug!("Connectivity test timed out after {:?}", limit);
            Err(FailureKind::Timeout)
        }
    }
}
