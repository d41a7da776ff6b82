//! Token substitution for configuration values
//!
//! A token is the literal sequence `${` followed by any characters up to
//! and including the next `}`. Tokens resolve through a provider registry:
//! `${rand:<label>}` generates a fresh identifier, `${secret:<name>}` reads
//! a sibling configuration entry of the same service.
//!
//! Substitution is a single non-recursive pass: tokens are collected from
//! the original value, resolved once per distinct literal, and the original
//! string is folded into a fresh buffer with replacements spliced in.
//! Resolved text is never re-scanned, so substitution cannot loop.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::ConfigurationEntry;

/// Context provided to token providers during resolution
#[derive(Debug, Clone, Copy)]
pub struct TokenContext<'a> {
    /// Name of the service whose value is being rewritten
    pub service: &'a str,
    /// The same service's configuration entries, in their current state
    pub entries: &'a [ConfigurationEntry],
}

/// Trait for token provider implementations
pub trait TokenProvider: Send + Sync {
    /// Resolve a token argument to its replacement text
    fn resolve(&self, argument: &str, ctx: &TokenContext<'_>) -> Result<String>;

    /// Get the name of this provider
    fn name(&self) -> &str;
}

/// Built-in `rand` provider
///
/// The argument is opaque; every resolution produces a fresh UUID. Because
/// tokens are deduplicated before resolution, a value containing the same
/// literal token twice receives one identifier for both occurrences.
pub struct RandProvider;

impl TokenProvider for RandProvider {
    fn resolve(&self, _argument: &str, _ctx: &TokenContext<'_>) -> Result<String> {
        Ok(Uuid::new_v4().to_string())
    }

    fn name(&self) -> &str {
        "rand"
    }
}

/// Built-in `secret` provider
///
/// Resolves to the named sibling configuration entry's *current* value.
/// Entries are rewritten in document order, so a token referencing an entry
/// the substitution pass has not reached yet sees that entry's raw text.
/// That ordering hazard is part of the contract; callers who need ordering
/// must order their entries.
pub struct SecretProvider;

impl TokenProvider for SecretProvider {
    fn resolve(&self, argument: &str, ctx: &TokenContext<'_>) -> Result<String> {
        ctx.entries
            .iter()
            .find(|entry| entry.name == argument)
            .map(|entry| entry.value.clone())
            .ok_or_else(|| Error::unresolved_secret(argument))
    }

    fn name(&self) -> &str {
        "secret"
    }
}

/// Registry of available token providers
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn TokenProvider>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Create a registry with the built-in providers (rand, secret)
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(RandProvider));
        registry.register(Arc::new(SecretProvider));
        registry
    }

    /// Register a provider
    pub fn register(&mut self, provider: Arc<dyn TokenProvider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    /// Check if a provider is registered
    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Resolve one literal token, `${` and `}` included
    ///
    /// The token body splits on `:` into exactly two segments; anything
    /// else, or a provider this registry does not know, is an unknown
    /// token.
    pub fn resolve_token(&self, token: &str, ctx: &TokenContext<'_>) -> Result<String> {
        let body = &token[2..token.len() - 1];
        let segments: Vec<&str> = body.split(':').collect();
        if segments.len() != 2 {
            return Err(Error::unknown_token(token));
        }

        let provider = self
            .providers
            .get(segments[0])
            .ok_or_else(|| Error::unknown_token(token))?;

        provider.resolve(segments[1], ctx)
    }
}

/// Collect the distinct literal tokens of a value
///
/// A `${` with no `}` before the end of the string is an unterminated
/// token; the error carries the truncated text.
pub fn collect_tokens(text: &str) -> Result<BTreeSet<String>> {
    let mut tokens = BTreeSet::new();

    let mut i = 0;
    while let Some(found) = text[i..].find("${") {
        let start = i + found;
        match text[start..].find('}') {
            Some(offset) => {
                let end = start + offset;
                tokens.insert(text[start..=end].to_string());
                i = end + 1;
            }
            None => return Err(Error::unterminated_token(&text[start..])),
        }
    }

    Ok(tokens)
}

/// Rewrite a configuration value, replacing every token with its resolution
///
/// Each distinct literal token resolves once; the replacement applies to
/// every occurrence of that literal in the original string.
pub fn substitute(
    value: &str,
    registry: &ProviderRegistry,
    ctx: &TokenContext<'_>,
) -> Result<String> {
    let tokens = collect_tokens(value)?;
    if tokens.is_empty() {
        return Ok(value.to_string());
    }

    let mut replacements = BTreeMap::new();
    for token in &tokens {
        let replacement = registry.resolve_token(token, ctx)?;
        log::trace!(
            "service '{}': resolved token '{}' ({} chars)",
            ctx.service,
            token,
            replacement.len()
        );
        replacements.insert(token.as_str(), replacement);
    }

    // Fold over the original value; replacements are never re-scanned.
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(found) = rest.find("${") {
        out.push_str(&rest[..found]);
        let end = rest[found..]
            .find('}')
            .map(|offset| found + offset + 1)
            .ok_or_else(|| Error::unterminated_token(&rest[found..]))?;
        out.push_str(&replacements[&rest[found..end]]);
        rest = &rest[end..];
    }
    out.push_str(rest);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, TokenErrorKind};
    use pretty_assertions::assert_eq;

    fn entries(pairs: &[(&str, &str)]) -> Vec<ConfigurationEntry> {
        pairs
            .iter()
            .map(|(name, value)| ConfigurationEntry::new(*name, *value))
            .collect()
    }

    fn ctx<'a>(entries: &'a [ConfigurationEntry]) -> TokenContext<'a> {
        TokenContext {
            service: "api",
            entries,
        }
    }

    #[test]
    fn test_collect_no_tokens() {
        assert!(collect_tokens("plain value").unwrap().is_empty());
        assert!(collect_tokens("").unwrap().is_empty());
        assert!(collect_tokens("just $dollar").unwrap().is_empty());
    }

    #[test]
    fn test_collect_finds_tokens() {
        let tokens = collect_tokens("a ${rand:x} b ${secret:db} c").unwrap();

        assert_eq!(tokens.len(), 2);
        assert!(tokens.contains("${rand:x}"));
        assert!(tokens.contains("${secret:db}"));
    }

    #[test]
    fn test_collect_dedups_identical_literals() {
        let tokens = collect_tokens("${rand:a}-${rand:a}").unwrap();

        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn test_collect_unterminated() {
        let err = collect_tokens("prefix-${unclosed").unwrap_err();

        assert_eq!(
            err.kind,
            ErrorKind::Token(TokenErrorKind::Unterminated {
                text: "${unclosed".into()
            })
        );
    }

    #[test]
    fn test_secret_lookup() {
        let entries = entries(&[("db", "pw123")]);
        let registry = ProviderRegistry::with_builtins();

        let result = substitute("${secret:db}", &registry, &ctx(&entries)).unwrap();

        assert_eq!(result, "pw123");
    }

    #[test]
    fn test_secret_embedded_in_larger_value() {
        let entries = entries(&[("db", "pw123")]);
        let registry = ProviderRegistry::with_builtins();

        let result = substitute(
            "server=db;password=${secret:db};ssl=true",
            &registry,
            &ctx(&entries),
        )
        .unwrap();

        assert_eq!(result, "server=db;password=pw123;ssl=true");
    }

    #[test]
    fn test_secret_missing() {
        let entries = entries(&[("db", "pw123")]);
        let registry = ProviderRegistry::with_builtins();

        let err = substitute("${secret:missing}", &registry, &ctx(&entries)).unwrap_err();

        assert_eq!(
            err.kind,
            ErrorKind::Token(TokenErrorKind::UnresolvedSecret {
                name: "missing".into()
            })
        );
    }

    #[test]
    fn test_rand_is_a_uuid() {
        let entries = entries(&[]);
        let registry = ProviderRegistry::with_builtins();

        let result = substitute("${rand:guid}", &registry, &ctx(&entries)).unwrap();

        assert!(Uuid::parse_str(&result).is_ok());
    }

    #[test]
    fn test_rand_same_literal_shares_one_value() {
        let entries = entries(&[]);
        let registry = ProviderRegistry::with_builtins();

        let result = substitute("${rand:a}-${rand:a}", &registry, &ctx(&entries)).unwrap();

        // A UUID contains dashes itself, so split by position: 36 + 1 + 36
        assert_eq!(result.len(), 36 * 2 + 1);
        assert_eq!(&result[..36], &result[37..]);
        assert!(Uuid::parse_str(&result[..36]).is_ok());
    }

    #[test]
    fn test_rand_distinct_literals_get_distinct_values() {
        let entries = entries(&[]);
        let registry = ProviderRegistry::with_builtins();

        let result = substitute("${rand:a};${rand:b}", &registry, &ctx(&entries)).unwrap();
        let parts: Vec<&str> = result.split(';').collect();

        assert_eq!(parts.len(), 2);
        assert_ne!(parts[0], parts[1]);
    }

    #[test]
    fn test_unknown_provider() {
        let entries = entries(&[]);
        let registry = ProviderRegistry::with_builtins();

        let err = substitute("${vault:key}", &registry, &ctx(&entries)).unwrap_err();

        assert_eq!(
            err.kind,
            ErrorKind::Token(TokenErrorKind::Unknown {
                token: "${vault:key}".into()
            })
        );
    }

    #[test]
    fn test_wrong_segment_count() {
        let entries = entries(&[]);
        let registry = ProviderRegistry::with_builtins();

        for value in ["${rand}", "${secret:a:b}", "${}"] {
            let err = substitute(value, &registry, &ctx(&entries)).unwrap_err();
            assert!(
                matches!(err.kind, ErrorKind::Token(TokenErrorKind::Unknown { .. })),
                "expected unknown token for {}",
                value
            );
        }
    }

    #[test]
    fn test_replacement_not_rescanned() {
        // The resolved secret contains text shaped like a token; a single
        // non-recursive pass must leave it alone.
        let entries = entries(&[("tricky", "${secret:other}"), ("other", "boom")]);
        let registry = ProviderRegistry::with_builtins();

        let result = substitute("${secret:tricky}", &registry, &ctx(&entries)).unwrap();

        assert_eq!(result, "${secret:other}");
    }

    #[test]
    fn test_registry_builtins() {
        let registry = ProviderRegistry::with_builtins();

        assert!(registry.contains("rand"));
        assert!(registry.contains("secret"));
        assert!(!registry.contains("env"));
    }

    #[test]
    fn test_custom_provider() {
        struct UpperProvider;
        impl TokenProvider for UpperProvider {
            fn resolve(&self, argument: &str, _ctx: &TokenContext<'_>) -> Result<String> {
                Ok(argument.to_uppercase())
            }
            fn name(&self) -> &str {
                "upper"
            }
        }

        let mut registry = ProviderRegistry::with_builtins();
        registry.register(Arc::new(UpperProvider));
        let entries = entries(&[]);

        let result = substitute("${upper:loud}", &registry, &ctx(&entries)).unwrap();

        assert_eq!(result, "LOUD");
    }
}
