//! Credential lookup for auth headers.

use std::collections::HashMap;
use std::env;

use crate::roster::SecretSource;

/// Key/value source for `env:` auth header values.
///
/// Looked up on every request so a rotated value is picked up without
/// a restart.
pub trait SecretResolver: Send + Sync {
    fn resolve(&self, key: &str) -> Option<String>;
}

/// Resolves keys against the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvResolver;

impl SecretResolver for EnvResolver {
    fn resolve(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

/// Resolves keys against a fixed map.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    values: HashMap<String, String>,
}

impl StaticResolver {
    pub fn new<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: values.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl SecretResolver for StaticResolver {
    fn resolve(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Current value of `source`, or `None` if an `env:` key is unset.
pub fn resolve_source(source: &SecretSource, resolver: &dyn SecretResolver) -> Option<String> {
    match source {
        SecretSource::Literal(value) => Some(value.clone()),
        SecretSource::Env(key) => resolver.resolve(key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_resolver() {
        let resolver = StaticResolver::new([("API_KEY", "abc")]);
        assert_eq!(resolver.resolve("API_KEY").as_deref(), Some("abc"));
        assert_eq!(resolver.resolve("OTHER"), None);
    }

    #[test]
    fn test_resolve_source() {
        let resolver = StaticResolver::new([("API_KEY", "abc")]);
        let env = SecretSource::Env("API_KEY".to_string());
        let missing = SecretSource::Env("MISSING".to_string());
        let literal = SecretSource::Literal("Bearer xyz".to_string());

        assert_eq!(resolve_source(&env, &resolver).as_deref(), Some("abc"));
        assert_eq!(resolve_source(&missing, &resolver), None);
        assert_eq!(resolve_source(&literal, &resolver).as_deref(), Some("Bearer xyz"));
    }

    #[test]
    fn test_env_resolver_reads_at_call_time() {
        let key = "STATUS_CHECKS_TEST_SECRET_RESOLVER";
        env::remove_var(key);
        assert_eq!(EnvResolver.resolve(key), None);

        env::set_var(key, "first");
        assert_eq!(EnvResolver.resolve(key).as_deref(), Some("first"));

        env::set_var(key, "rotated");
        assert_eq!(EnvResolver.resolve(key).as_deref(), Some("rotated"));
        env::remove_var(key);
    }
}
