//! Request context and the variables registered for it.
use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use serde::Deserialize;
use smol_str::SmolStr;
use varc_lang::{
    Field, HandlerError, Registry, RegistryError, SharedRegistry, VariableDecl, hash_field_name,
};

/// One incoming request, as read from a JSON line.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Request {
    pub method: String,
    pub uri: String,
    pub host: String,
    pub remote_addr: String,
    pub headers: BTreeMap<String, String>,
    pub args: BTreeMap<String, String>,
    pub cookies: BTreeMap<String, String>,
}

impl Request {
    pub fn path(&self) -> &str {
        self.uri
            .split_once('?')
            .map_or(self.uri.as_str(), |(path, _)| path)
    }

    pub fn query(&self) -> &str {
        self.uri.split_once('?').map_or("", |(_, query)| query)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

static VARIABLES: SharedRegistry<Request> = SharedRegistry::new();

static REGISTRY: LazyLock<Result<Arc<Registry<Request>>, RegistryError>> = LazyLock::new(|| {
    VARIABLES.register(variables())?;
    VARIABLES.finalize_index()
});

/// The frozen registry of request variables.
pub fn registry() -> Result<Arc<Registry<Request>>, RegistryError> {
    REGISTRY.clone()
}

/// Header names are case-insensitive and made of token characters.
pub fn hash_header_name(name: &str) -> Option<u64> {
    if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
    {
        return None;
    }

    hash_field_name(&name.to_ascii_lowercase())
}

fn normalize_header_name(name: &str) -> SmolStr {
    name.to_ascii_lowercase().into()
}

fn field_name(field: Option<&Field>) -> &str {
    field.map(|field| field.name.as_str()).unwrap_or_default()
}

fn lookup(
    kind: &str,
    map: &BTreeMap<String, String>,
    field: Option<&Field>,
    out: &mut String,
) -> Result<(), HandlerError> {
    let name = field_name(field);
    let value = map
        .get(name)
        .ok_or_else(|| HandlerError::not_found(format!("{kind} \"{name}\"")))?;
    out.push_str(value);
    Ok(())
}

fn variables() -> Vec<VariableDecl<Request>> {
    vec![
        VariableDecl::new("method", |r: &Request, _, out: &mut String| {
            out.push_str(&r.method);
            Ok(())
        }),
        VariableDecl::new("uri", |r: &Request, _, out: &mut String| {
            out.push_str(&r.uri);
            Ok(())
        }),
        VariableDecl::new("path", |r: &Request, _, out: &mut String| {
            out.push_str(r.path());
            Ok(())
        }),
        VariableDecl::new("query", |r: &Request, _, out: &mut String| {
            out.push_str(r.query());
            Ok(())
        }),
        VariableDecl::new("host", |r: &Request, _, out: &mut String| {
            match r.header("Host") {
                Some(host) if r.host.is_empty() => out.push_str(host),
                _ => out.push_str(&r.host),
            }
            Ok(())
        })
        .cacheable(),
        VariableDecl::new("remote_addr", |r: &Request, _, out: &mut String| {
            if r.remote_addr.is_empty() {
                return Err(HandlerError::not_found("remote address"));
            }
            out.push_str(&r.remote_addr);
            Ok(())
        }),
        VariableDecl::new("request_line", |r: &Request, _, out: &mut String| {
            out.push_str(&r.method);
            out.push(' ');
            out.push_str(&r.uri);
            Ok(())
        })
        .cacheable(),
        VariableDecl::new(
            "header",
            |r: &Request, field: Option<&Field>, out: &mut String| {
                let name = field_name(field);
                let value = r
                    .header(name)
                    .ok_or_else(|| HandlerError::not_found(format!("header \"{name}\"")))?;
                out.push_str(value);
                Ok(())
            },
        )
        .fieldable(hash_header_name)
        .normalized(normalize_header_name),
        VariableDecl::new(
            "arg",
            |r: &Request, field: Option<&Field>, out: &mut String| {
                lookup("argument", &r.args, field, out)
            },
        )
        .fieldable(hash_field_name),
        VariableDecl::new(
            "cookie",
            |r: &Request, field: Option<&Field>, out: &mut String| {
                lookup("cookie", &r.cookies, field, out)
            },
        )
        .fieldable(hash_field_name),
    ]
}
