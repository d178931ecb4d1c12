//! Endpoint configuration.

/// Environment variable overriding the game-server URL.
pub const ENV_SERVER_URL: &str = "PARQUES_SERVER_URL";

/// Port the game server listens on by default.
pub const DEFAULT_PORT: u16 = 3000;

/// Resolve the WebSocket endpoint for the game server.
///
/// Honors the `PARQUES_SERVER_URL` override; otherwise defaults to the
/// local host on the fixed server port.
pub fn resolve_server_url() -> String {
    match std::env::var(ENV_SERVER_URL) {
        Ok(url) if !url.trim().is_empty() => url,
        _ => format!("ws://localhost:{DEFAULT_PORT}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_url_targets_the_fixed_port() {
        // Avoid mutating process env in tests; just check the default shape.
        if std::env::var(ENV_SERVER_URL).is_err() {
            assert_eq!(resolve_server_url(), "ws://localhost:3000");
        }
    }
}
