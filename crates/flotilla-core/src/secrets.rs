//! Secret list parsing
//!
//! The `secrets` key of a manifest holds a sequence of mappings, each a
//! reference to an externally stored secret. Only `name`, `source`, and
//! `type` are recognized; values are lower-cased on read. Resolution of
//! the secrets themselves happens outside this crate.

use crate::error::{Error, Result};
use crate::model::Secret;
use crate::node::Node;

/// Parse the `secrets` sequence into secret records, in document order
///
/// Duplicate names pass through untouched; collision handling belongs to
/// the consumer.
pub fn parse_secrets(key: &str, node: &Node) -> Result<Vec<Secret>> {
    let children = node.expect_sequence_for(key)?;

    let mut secrets = Vec::with_capacity(children.len());
    for (i, child) in children.iter().enumerate() {
        let secret =
            parse_secret(child).map_err(|e| e.in_segment(format!("secrets[{}]", i)))?;
        secrets.push(secret);
    }

    Ok(secrets)
}

fn parse_secret(node: &Node) -> Result<Secret> {
    let mapping = node.expect_mapping()?;

    let mut secret = Secret::default();
    for (key, value) in mapping {
        match key.as_str() {
            "name" => secret.name = value.expect_scalar_for(key)?.to_lowercase(),
            "source" => secret.source = value.expect_scalar_for(key)?.to_lowercase(),
            "type" => secret.kind = value.expect_scalar_for(key)?.to_lowercase(),
            _ => return Err(Error::unrecognized_key(key)),
        }
    }

    Ok(secret)
}
