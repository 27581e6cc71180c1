//! Control plane configuration

use std::time::Duration;

use docdesk_auth::token::DEFAULT_TOKEN_SIZE;
use docdesk_auth::TokenAlphabet;

/// Configuration shared by all control-plane components
///
/// `token_size` and `default_avatar` are fallbacks: the `TOKEN_SIZE` and
/// `DEFAULT_AVATAR` site options win when they hold a usable value.
#[derive(Debug, Clone)]
pub struct ControlConfig {
    /// Public base URL used to build access links (e.g. "https://docs.example.com")
    pub base_url: String,
    /// Route prefix of the document reader
    pub document_route: String,
    /// Access token length when the site option is unset
    pub token_size: usize,
    /// Symbol set for access tokens
    pub token_alphabet: TokenAlphabet,
    /// Avatar assigned to new members when the site option is unset
    pub default_avatar: String,
    /// Upper bound on one operation's storage round-trips
    pub storage_timeout: Duration,
    /// Clear the access token when a book becomes public
    ///
    /// Off by default: a stored token stays on the record (inert, since
    /// verification requires a private book) until explicitly revoked.
    pub revoke_token_on_public: bool,
    /// Page size of the member listing
    pub member_page_size: u64,
    /// Page size of the book listing
    pub book_page_size: u64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8181".to_string(),
            document_route: "/docs".to_string(),
            token_size: DEFAULT_TOKEN_SIZE,
            token_alphabet: TokenAlphabet::All,
            default_avatar: "/static/images/headimgurl.jpg".to_string(),
            storage_timeout: Duration::from_secs(5),
            revoke_token_on_public: false,
            member_page_size: 15,
            book_page_size: 20,
        }
    }
}

impl ControlConfig {
    /// Fully-qualified reader URL carrying `token` as a query credential
    pub fn access_url(&self, identify: &str, token: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let route = self.document_route.trim_matches('/');

        if route.is_empty() {
            format!("{}/{}?token={}", base, identify, token)
        } else {
            format!("{}/{}/{}?token={}", base, route, identify, token)
        }
    }
}
