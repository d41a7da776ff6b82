//! Application body parsing
//!
//! Maps the root mapping of a manifest onto the configuration model, one
//! recognized key at a time. Every mapping in the document has a closed
//! key set; an unknown key aborts the load.

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::model::{
    Application, ConfigurationEntry, Ingress, IngressBinding, IngressRule, Service,
    ServiceBinding, Volume,
};
use crate::node::Node;
use crate::secrets;

/// Populate an application from the manifest's root mapping
pub fn parse_application(root: &IndexMap<String, Node>, app: &mut Application) -> Result<()> {
    for (key, node) in root {
        match key.as_str() {
            "name" => app.name = node.expect_scalar_for(key)?.to_lowercase(),
            "services" => {
                for (i, child) in node.expect_sequence_for(key)?.iter().enumerate() {
                    let service = parse_service(child)
                        .map_err(|e| e.in_segment(format!("services[{}]", i)))?;
                    app.services.push(service);
                }
            }
            "ingress" => {
                for (i, child) in node.expect_sequence_for(key)?.iter().enumerate() {
                    let ingress = parse_ingress(child)
                        .map_err(|e| e.in_segment(format!("ingress[{}]", i)))?;
                    app.ingress.push(ingress);
                }
            }
            "secrets" => app.secrets = secrets::parse_secrets(key, node)?,
            _ => return Err(Error::unrecognized_key(key)),
        }
    }

    Ok(())
}

fn parse_service(node: &Node) -> Result<Service> {
    let mapping = node.expect_mapping()?;

    let mut service = Service::new("");
    for (key, value) in mapping {
        match key.as_str() {
            "name" => service.name = value.expect_scalar_for(key)?.to_lowercase(),
            "image" => service.image = Some(value.expect_scalar_for(key)?.to_string()),
            "executable" => service.executable = Some(value.expect_scalar_for(key)?.to_string()),
            "args" => service.args = Some(value.expect_scalar_for(key)?.to_string()),
            "replicas" => service.replicas = Some(parse_u32(key, value)?),
            "external" => service.external = parse_bool(key, value)?,
            "bindings" => {
                for (i, child) in value.expect_sequence_for(key)?.iter().enumerate() {
                    let binding = parse_service_binding(child)
                        .map_err(|e| e.in_segment(format!("bindings[{}]", i)))?;
                    service.bindings.push(binding);
                }
            }
            "configuration" => {
                for (i, child) in value.expect_sequence_for(key)?.iter().enumerate() {
                    let entry = parse_configuration_entry(child)
                        .map_err(|e| e.in_segment(format!("configuration[{}]", i)))?;
                    service.configuration.push(entry);
                }
            }
            "volumes" => {
                for (i, child) in value.expect_sequence_for(key)?.iter().enumerate() {
                    let volume = parse_volume(child)
                        .map_err(|e| e.in_segment(format!("volumes[{}]", i)))?;
                    service.volumes.push(volume);
                }
            }
            "tags" => service.tags = parse_tags(key, value)?,
            _ => return Err(Error::unrecognized_key(key)),
        }
    }

    Ok(service)
}

fn parse_service_binding(node: &Node) -> Result<ServiceBinding> {
    let mapping = node.expect_mapping()?;

    let mut binding = ServiceBinding::default();
    for (key, value) in mapping {
        match key.as_str() {
            "name" => binding.name = Some(value.expect_scalar_for(key)?.to_lowercase()),
            "port" => binding.port = Some(parse_u16(key, value)?),
            "containerPort" => binding.container_port = Some(parse_u16(key, value)?),
            "host" => binding.host = Some(value.expect_scalar_for(key)?.to_string()),
            "protocol" => binding.protocol = Some(value.expect_scalar_for(key)?.to_lowercase()),
            _ => return Err(Error::unrecognized_key(key)),
        }
    }

    Ok(binding)
}

fn parse_configuration_entry(node: &Node) -> Result<ConfigurationEntry> {
    let mapping = node.expect_mapping()?;

    let mut entry = ConfigurationEntry::new("", "");
    for (key, value) in mapping {
        match key.as_str() {
            "name" => entry.name = value.expect_scalar_for(key)?.to_string(),
            "value" => entry.value = value.expect_scalar_for(key)?.to_string(),
            _ => return Err(Error::unrecognized_key(key)),
        }
    }

    Ok(entry)
}

fn parse_volume(node: &Node) -> Result<Volume> {
    let mapping = node.expect_mapping()?;

    let mut volume = Volume::default();
    for (key, value) in mapping {
        match key.as_str() {
            "name" => volume.name = Some(value.expect_scalar_for(key)?.to_lowercase()),
            "source" => volume.source = Some(value.expect_scalar_for(key)?.to_string()),
            "target" => volume.target = Some(value.expect_scalar_for(key)?.to_string()),
            _ => return Err(Error::unrecognized_key(key)),
        }
    }

    Ok(volume)
}

fn parse_ingress(node: &Node) -> Result<Ingress> {
    let mapping = node.expect_mapping()?;

    let mut ingress = Ingress::new("");
    for (key, value) in mapping {
        match key.as_str() {
            "name" => ingress.name = value.expect_scalar_for(key)?.to_lowercase(),
            "replicas" => ingress.replicas = Some(parse_u32(key, value)?),
            "bindings" => {
                for (i, child) in value.expect_sequence_for(key)?.iter().enumerate() {
                    let binding = parse_ingress_binding(child)
                        .map_err(|e| e.in_segment(format!("bindings[{}]", i)))?;
                    ingress.bindings.push(binding);
                }
            }
            "rules" => {
                for (i, child) in value.expect_sequence_for(key)?.iter().enumerate() {
                    let rule = parse_ingress_rule(child)
                        .map_err(|e| e.in_segment(format!("rules[{}]", i)))?;
                    ingress.rules.push(rule);
                }
            }
            "tags" => ingress.tags = parse_tags(key, value)?,
            _ => return Err(Error::unrecognized_key(key)),
        }
    }

    Ok(ingress)
}

fn parse_ingress_binding(node: &Node) -> Result<IngressBinding> {
    let mapping = node.expect_mapping()?;

    let mut binding = IngressBinding::default();
    for (key, value) in mapping {
        match key.as_str() {
            "name" => binding.name = Some(value.expect_scalar_for(key)?.to_lowercase()),
            "port" => binding.port = Some(parse_u16(key, value)?),
            "protocol" => binding.protocol = Some(value.expect_scalar_for(key)?.to_lowercase()),
            _ => return Err(Error::unrecognized_key(key)),
        }
    }

    Ok(binding)
}

fn parse_ingress_rule(node: &Node) -> Result<IngressRule> {
    let mapping = node.expect_mapping()?;

    let mut rule = IngressRule::default();
    for (key, value) in mapping {
        match key.as_str() {
            "host" => rule.host = Some(value.expect_scalar_for(key)?.to_string()),
            "path" => rule.path = Some(value.expect_scalar_for(key)?.to_string()),
            "service" => rule.service = Some(value.expect_scalar_for(key)?.to_lowercase()),
            _ => return Err(Error::unrecognized_key(key)),
        }
    }

    Ok(rule)
}

fn parse_tags(key: &str, node: &Node) -> Result<Vec<String>> {
    let children = node.expect_sequence_for(key)?;

    let mut tags = Vec::with_capacity(children.len());
    for child in children {
        tags.push(child.expect_scalar_for(key)?.to_string());
    }

    Ok(tags)
}

fn parse_u32(key: &str, node: &Node) -> Result<u32> {
    let text = node.expect_scalar_for(key)?;
    text.parse()
        .map_err(|_| Error::invalid_value(key, format!("'{}' must be a non-negative integer", text)))
}

fn parse_u16(key: &str, node: &Node) -> Result<u16> {
    let text = node.expect_scalar_for(key)?;
    text.parse()
        .map_err(|_| Error::invalid_value(key, format!("'{}' must be a port number", text)))
}

fn parse_bool(key: &str, node: &Node) -> Result<bool> {
    let text = node.expect_scalar_for(key)?;
    if text.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if text.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(Error::invalid_value(
            key,
            format!("'{}' must be true or false", text),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> Result<Application> {
        let value: serde_yaml::Value = serde_yaml::from_str(text).unwrap();
        let root = Node::from_yaml(value).unwrap();
        let mut app = Application::new("flotilla.yaml");
        parse_application(root.expect_mapping()?, &mut app)?;
        Ok(app)
    }

    #[test]
    fn test_full_service() {
        let app = parse(
            r#"
name: Shop
services:
  - name: API
    image: shop/api:1.2
    replicas: 3
    bindings:
      - name: HTTP
        port: 8080
        containerPort: 80
        protocol: HTTP
    configuration:
      - name: MODE
        value: production
    volumes:
      - source: ./data
        target: /var/data
    tags:
      - backend
"#,
        )
        .unwrap();

        assert_eq!(app.name, "shop");
        let service = &app.services[0];
        assert_eq!(service.name, "api");
        assert_eq!(service.image.as_deref(), Some("shop/api:1.2"));
        assert_eq!(service.replicas, Some(3));
        assert_eq!(service.bindings[0].name.as_deref(), Some("http"));
        assert_eq!(service.bindings[0].port, Some(8080));
        assert_eq!(service.bindings[0].container_port, Some(80));
        assert_eq!(service.bindings[0].protocol.as_deref(), Some("http"));
        assert_eq!(service.configuration[0].name, "MODE");
        assert_eq!(service.configuration[0].value, "production");
        assert_eq!(service.volumes[0].target.as_deref(), Some("/var/data"));
        assert_eq!(service.tags, vec!["backend"]);
    }

    #[test]
    fn test_omitted_collections_are_empty() {
        let app = parse("services:\n  - name: bare\n").unwrap();
        let service = &app.services[0];

        assert!(service.bindings.is_empty());
        assert!(service.configuration.is_empty());
        assert!(service.volumes.is_empty());
        assert!(service.tags.is_empty());
    }

    #[test]
    fn test_external_service() {
        let app = parse("services:\n  - name: db\n    external: true\n").unwrap();

        assert!(app.services[0].external);
    }

    #[test]
    fn test_ingress() {
        let app = parse(
            r#"
ingress:
  - name: Front
    replicas: 2
    bindings:
      - port: 443
        protocol: https
    rules:
      - host: shop.example.com
        path: /api
        service: API
"#,
        )
        .unwrap();

        let ingress = &app.ingress[0];
        assert_eq!(ingress.name, "front");
        assert_eq!(ingress.replicas, Some(2));
        assert_eq!(ingress.bindings[0].port, Some(443));
        assert_eq!(ingress.rules[0].host.as_deref(), Some("shop.example.com"));
        assert_eq!(ingress.rules[0].service.as_deref(), Some("api"));
        assert!(ingress.tags.is_empty());
    }

    #[test]
    fn test_unknown_top_level_key() {
        let err = parse("nmae: typo\n").unwrap_err();

        assert_eq!(err.kind, ErrorKind::UnrecognizedKey { key: "nmae".into() });
    }

    #[test]
    fn test_unknown_service_key_carries_path() {
        let err = parse("services:\n  - name: api\n    imgae: oops\n").unwrap_err();

        assert_eq!(err.kind, ErrorKind::UnrecognizedKey { key: "imgae".into() });
        assert_eq!(err.path.as_deref(), Some("services[0]"));
    }

    #[test]
    fn test_unknown_binding_key_carries_nested_path() {
        let err = parse(
            "services:\n  - name: api\n    bindings:\n      - port: 80\n      - prot: http\n",
        )
        .unwrap_err();

        assert_eq!(err.kind, ErrorKind::UnrecognizedKey { key: "prot".into() });
        assert_eq!(err.path.as_deref(), Some("services[0].bindings[1]"));
    }

    #[test]
    fn test_port_must_be_integer() {
        let err = parse("services:\n  - name: api\n    bindings:\n      - port: http\n")
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::InvalidValue { key: "port".into() });
    }

    #[test]
    fn test_replicas_must_be_integer() {
        let err = parse("services:\n  - name: api\n    replicas: many\n").unwrap_err();

        assert_eq!(
            err.kind,
            ErrorKind::InvalidValue {
                key: "replicas".into()
            }
        );
    }

    #[test]
    fn test_external_must_be_bool() {
        let err = parse("services:\n  - name: db\n    external: yep\n").unwrap_err();

        assert_eq!(
            err.kind,
            ErrorKind::InvalidValue {
                key: "external".into()
            }
        );
    }

    #[test]
    fn test_services_must_be_sequence() {
        let err = parse("services: api\n").unwrap_err();

        assert_eq!(
            err.kind,
            ErrorKind::ExpectedForKey {
                key: "services".into(),
                expected: crate::node::NodeKind::Sequence,
            }
        );
    }

    #[test]
    fn test_service_order_preserved() {
        let app = parse("services:\n  - name: c\n  - name: a\n  - name: b\n").unwrap();
        let names: Vec<&str> = app.services.iter().map(|s| s.name.as_str()).collect();

        assert_eq!(names, vec!["c", "a", "b"]);
    }
}
