use solana_client::client_error::ClientError;
use thiserror::Error;

/// JSON-RPC server codes for conditions that clear up on their own: block not
/// available, node unhealthy, block status not yet available, minimum context
/// slot not reached
const TRANSIENT_RPC_CODES: [i64; 4] = [-32004, -32005, -32014, -32016];

/// Errors raised by chain RPC calls
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Transport-level errors (network, connection)
    #[error("Transport error: {message} (endpoint: {endpoint})")]
    Transport { endpoint: String, message: String },

    /// Timeout errors
    #[error("Timeout (endpoint: {endpoint})")]
    Timeout { endpoint: String },

    /// Rate limit exceeded
    #[error("Rate limit exceeded (endpoint: {endpoint})")]
    RateLimited { endpoint: String },

    /// RPC response errors (from the RPC server)
    #[error("RPC response error: {message} (endpoint: {endpoint}, code: {code:?})")]
    RpcResponse {
        endpoint: String,
        message: String,
        code: Option<i64>,
    },

    /// Signature string could not be parsed
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// The node returned no transaction for a known signature
    #[error("Transaction not found: {0}")]
    MissingTransaction(String),

    /// Response could not be decoded into a record
    #[error("Decode error for {signature}: {message}")]
    Decode { signature: String, message: String },
}

impl FetchError {
    /// Check if this error is worth retrying on a later tick
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport { .. } => true,
            FetchError::Timeout { .. } => true,
            FetchError::RateLimited { .. } => true,
            FetchError::RpcResponse { code, .. } => {
                matches!(code, Some(c) if TRANSIENT_RPC_CODES.contains(c))
            }
            FetchError::MissingTransaction(_) => true,
            FetchError::InvalidSignature(_) => false,
            FetchError::Decode { .. } => false,
        }
    }

    /// Create from ClientError with context
    pub fn from_client_error(err: ClientError, endpoint: &str) -> Self {
        Self::classify(&err.to_string(), endpoint)
    }

    /// Classify a client error message
    pub fn classify(message: &str, endpoint: &str) -> Self {
        let lowered = message.to_lowercase();

        if lowered.contains("rate limit")
            || lowered.contains("too many requests")
            || lowered.contains("429")
        {
            FetchError::RateLimited {
                endpoint: endpoint.to_string(),
            }
        } else if lowered.contains("timeout") || lowered.contains("timed out") {
            FetchError::Timeout {
                endpoint: endpoint.to_string(),
            }
        } else if lowered.contains("connection")
            || lowered.contains("dns")
            || lowered.contains("error sending request")
            || lowered.contains("http status server error")
        {
            FetchError::Transport {
                endpoint: endpoint.to_string(),
                message: message.to_string(),
            }
        } else {
            FetchError::RpcResponse {
                endpoint: endpoint.to_string(),
                message: message.to_string(),
                code: response_code(&lowered),
            }
        }
    }
}

/// JSON-RPC error code, as in "RPC response error -32005: ..." or "code: -32005"
fn response_code(lowered: &str) -> Option<i64> {
    ["rpc response error", "code:"].iter().find_map(|marker| {
        let rest = lowered.split(marker).nth(1)?.trim_start();
        let end = rest
            .find(|c: char| c != '-' && !c.is_ascii_digit())
            .unwrap_or(rest.len());
        rest[..end].parse().ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_rate_limit() {
        let err = FetchError::classify("HTTP status client error (429 Too Many Requests)", "rpc");
        assert_eq!(
            err,
            FetchError::RateLimited {
                endpoint: "rpc".to_string()
            }
        );
        assert!(err.is_retryable());
    }

    #[test]
    fn test_classify_timeout() {
        let err = FetchError::classify("operation timed out", "rpc");
        assert!(matches!(err, FetchError::Timeout { .. }));
    }

    #[test]
    fn test_classify_transport() {
        let err = FetchError::classify("error sending request for url", "rpc");
        assert!(matches!(err, FetchError::Transport { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_classify_response_code() {
        let err = FetchError::classify("RPC response error code: -32009 slot skipped", "rpc");
        match err {
            FetchError::RpcResponse { code, .. } => assert_eq!(code, Some(-32009)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_classify_node_error_code() {
        let err = FetchError::classify("RPC response error -32005: Node is unhealthy; ", "rpc");
        assert_eq!(
            err,
            FetchError::RpcResponse {
                endpoint: "rpc".to_string(),
                message: "RPC response error -32005: Node is unhealthy; ".to_string(),
                code: Some(-32005),
            }
        );
        assert!(err.is_retryable());

        let err = FetchError::classify("RPC response error -32602: Invalid param: WrongSize", "rpc");
        assert!(matches!(err, FetchError::RpcResponse { code: Some(-32602), .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_http_server_error_is_retryable() {
        let err = FetchError::classify(
            "HTTP status server error (503 Service Unavailable) for url (https://api.mainnet-beta.solana.com/)",
            "rpc",
        );
        assert!(matches!(err, FetchError::Transport { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_non_retryable() {
        assert!(!FetchError::InvalidSignature("x".to_string()).is_retryable());
        assert!(!FetchError::Decode {
            signature: "x".to_string(),
            message: "bad".to_string()
        }
        .is_retryable());
        assert!(!FetchError::RpcResponse {
            endpoint: "rpc".to_string(),
            message: "bad request".to_string(),
            code: Some(-32602),
        }
        .is_retryable());
    }
}
