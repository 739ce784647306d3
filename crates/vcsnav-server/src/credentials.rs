//! Per-session credential storage.
//!
//! One opaque token per provider id, held in an httpOnly/secure/
//! SameSite=Strict cookie with a 1-year expiry. The token value is never
//! included in a response body and never logged; handlers only ever expose
//! the boolean presence flag.

use cookie::time::Duration;
use cookie::SameSite;
use tower_cookies::{Cookie, Cookies};
use vcsnav_core::token_cookie_name;

const TOKEN_TTL_DAYS: i64 = 365;

/// Explicit credential dependency of the proxy controller. The production
/// implementation is cookie-backed; tests substitute an in-memory fake.
pub trait CredentialStore: Send + Sync {
    fn save(&self, vcs_id: &str, token: &str);
    fn remove(&self, vcs_id: &str);
    fn get(&self, vcs_id: &str) -> Option<String>;

    fn has(&self, vcs_id: &str) -> bool {
        self.get(vcs_id).is_some()
    }
}

/// Cookie-backed store scoped to one request/response exchange.
pub struct CookieCredentialStore {
    cookies: Cookies,
}

impl CookieCredentialStore {
    pub fn new(cookies: Cookies) -> Self {
        Self { cookies }
    }

    fn base_cookie(vcs_id: &str, value: String) -> Cookie<'static> {
        Cookie::build((token_cookie_name(vcs_id), value))
            .http_only(true)
            .secure(true)
            .same_site(SameSite::Strict)
            .path("/")
            .build()
    }
}

impl CredentialStore for CookieCredentialStore {
    fn save(&self, vcs_id: &str, token: &str) {
        let mut cookie = Self::base_cookie(vcs_id, token.to_string());
        cookie.set_max_age(Duration::days(TOKEN_TTL_DAYS));
        self.cookies.add(cookie);
    }

    fn remove(&self, vcs_id: &str) {
        self.cookies.remove(Self::base_cookie(vcs_id, String::new()));
    }

    fn get(&self, vcs_id: &str) -> Option<String> {
        self.cookies
            .get(&token_cookie_name(vcs_id))
            .map(|cookie| cookie.value().to_string())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::CredentialStore;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory fake for exercising controller logic without a transport.
    #[derive(Default)]
    pub struct MemoryCredentialStore {
        tokens: Mutex<HashMap<String, String>>,
    }

    impl MemoryCredentialStore {
        pub fn with_token(vcs_id: &str, token: &str) -> Self {
            let store = Self::default();
            store.save(vcs_id, token);
            store
        }
    }

    impl CredentialStore for MemoryCredentialStore {
        fn save(&self, vcs_id: &str, token: &str) {
            self.tokens
                .lock()
                .unwrap()
                .insert(vcs_id.to_string(), token.to_string());
        }

        fn remove(&self, vcs_id: &str) {
            self.tokens.lock().unwrap().remove(vcs_id);
        }

        fn get(&self, vcs_id: &str) -> Option<String> {
            self.tokens.lock().unwrap().get(vcs_id).cloned()
        }
    }
}
