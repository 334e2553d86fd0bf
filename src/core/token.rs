use base64::{engine::general_purpose::URL_SAFE, Engine as _};

/// Random bytes behind an application link token.
pub const LINK_TOKEN_BYTES: usize = 24;

/// URL-safe random token, 32 characters for the default byte length.
pub fn generate_link_token() -> String {
    let bytes: [u8; LINK_TOKEN_BYTES] = rand::random();
    URL_SAFE.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_link_token() {
        let token = generate_link_token();
        assert_eq!(token.len(), 32);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(token, generate_link_token());
    }
}
