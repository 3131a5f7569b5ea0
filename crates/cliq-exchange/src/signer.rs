//! HMAC-SHA256 request signing for the Binance API.

use crate::credentials::ApiCredentials;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Request signer for authenticated Binance API calls.
pub struct RequestSigner<'a> {
    credentials: &'a ApiCredentials,
}

impl<'a> RequestSigner<'a> {
    /// Create a new request signer with the given credentials.
    pub fn new(credentials: &'a ApiCredentials) -> Self {
        Self { credentials }
    }

    /// Sign a message and return the hex-encoded signature.
    ///
    /// Computes HMAC-SHA256 of the message using the secret key and
    /// returns the result as a lowercase hex string.
    pub fn sign(&self, message: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.credentials.expose_secret().as_bytes())
            .expect("HMAC can take key of any size");

        mac.update(message.as_bytes());
        let result = mac.finalize();
        hex::encode(result.into_bytes())
    }

    /// Build a signed query string, preserving parameter order.
    ///
    /// Appends `timestamp` and `recvWindow` after the caller's params,
    /// signs the whole query, and appends the signature last.
    pub fn signed_query(
        &self,
        params: &[(&str, &str)],
        timestamp_ms: i64,
        recv_window_ms: u64,
    ) -> String {
        let mut parts: Vec<String> =
            params.iter().map(|(k, v)| format!("{k}={v}")).collect();

        parts.push(format!("timestamp={timestamp_ms}"));
        parts.push(format!("recvWindow={recv_window_ms}"));

        let query_string = parts.join("&");
        let signature = self.sign(&query_string);
        format!("{query_string}&signature={signature}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_known_vector() {
        // Test vector from the Binance API documentation.
        let creds = ApiCredentials::new(
            "vmPUZE6mv9SD5VNHk4HlWFsOr6aKE2zvsw0MuIgwCIPy6utIco14y7Ju91duEh8A".into(),
            "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j".into(),
        );

        let signer = RequestSigner::new(&creds);

        let query = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559";
        let signature = signer.sign(query);

        assert_eq!(
            signature,
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn test_signed_query_includes_timestamp_and_window() {
        let creds = ApiCredentials::new("key".into(), "secret".into());
        let signer = RequestSigner::new(&creds);

        let result = signer.signed_query(&[("symbol", "ICPUSDT")], 1000, 5000);

        assert!(result.starts_with("symbol=ICPUSDT&timestamp=1000&recvWindow=5000"));
        assert!(result.contains("&signature="));
    }

    #[test]
    fn test_signed_query_preserves_order() {
        let creds = ApiCredentials::new("key".into(), "secret".into());
        let signer = RequestSigner::new(&creds);

        let params = [("zebra", "1"), ("alpha", "2")];
        let result = signer.signed_query(&params, 1000, 5000);

        let signature_pos = result.find("&signature=").unwrap();
        let query_part = &result[..signature_pos];
        assert_eq!(query_part, "zebra=1&alpha=2&timestamp=1000&recvWindow=5000");
    }

    #[test]
    fn test_sign_empty_message() {
        let creds = ApiCredentials::new("key".into(), "secret".into());
        let signer = RequestSigner::new(&creds);

        let signature = signer.sign("");
        assert!(!signature.is_empty());
    }
}
