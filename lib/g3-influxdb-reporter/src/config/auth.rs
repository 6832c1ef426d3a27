/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::anyhow;
use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use http::HeaderValue;
use yaml_rust::Yaml;

#[derive(Clone, PartialEq, Eq)]
pub enum Authentication {
    Basic { user: String, password: String },
    Token(String),
}

impl std::fmt::Debug for Authentication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Authentication::Basic { user, .. } => f
                .debug_struct("Basic")
                .field("user", user)
                .finish_non_exhaustive(),
            Authentication::Token(_) => f.write_str("Token"),
        }
    }
}

impl Authentication {
    pub(crate) fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        let Yaml::Hash(map) = value else {
            return Err(anyhow!(
                "yaml value type for authentication should be 'map'"
            ));
        };

        let mut user: Option<String> = None;
        let mut password: Option<String> = None;
        let mut token: Option<String> = None;
        super::foreach_kv(map, |k, v| match super::normalize(k).as_str() {
            "user" | "username" => {
                user = Some(super::value::as_string(v)?);
                Ok(())
            }
            "password" => {
                password = Some(super::value::as_string(v)?);
                Ok(())
            }
            "token" => {
                token = Some(super::value::as_string(v)?);
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        })?;

        match (user, password, token) {
            (Some(user), Some(password), None) => {
                if user.is_empty() {
                    return Err(anyhow!("empty user name"));
                }
                Ok(Authentication::Basic { user, password })
            }
            (None, None, Some(token)) => {
                if token.is_empty() {
                    return Err(anyhow!("empty token"));
                }
                Ok(Authentication::Token(token))
            }
            (_, _, Some(_)) => Err(anyhow!("token can not be used together with user/password")),
            _ => Err(anyhow!("both user and password should be set")),
        }
    }

    /// Value of the `Authorization` request header.
    pub fn header_value(&self) -> anyhow::Result<HeaderValue> {
        let s = match self {
            Authentication::Basic { user, password } => {
                let encoded = BASE64_STANDARD.encode(format!("{user}:{password}"));
                format!("Basic {encoded}")
            }
            Authentication::Token(token) => format!("Token {token}"),
        };
        let mut value =
            HeaderValue::from_str(&s).map_err(|e| anyhow!("invalid authorization value: {e}"))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yaml_rust::YamlLoader;

    fn parse(s: &str) -> anyhow::Result<Authentication> {
        let docs = YamlLoader::load_from_str(s).unwrap();
        Authentication::parse_yaml(&docs[0])
    }

    #[test]
    fn basic() {
        let auth = parse("user: admin\npassword: secret").unwrap();
        assert_eq!(
            auth,
            Authentication::Basic {
                user: "admin".to_string(),
                password: "secret".to_string()
            }
        );
        let v = auth.header_value().unwrap();
        assert_eq!(v.to_str().unwrap(), "Basic YWRtaW46c2VjcmV0");
        assert!(v.is_sensitive());
    }

    #[test]
    fn token() {
        let auth = parse("token: abc123").unwrap();
        assert_eq!(auth.header_value().unwrap().to_str().unwrap(), "Token abc123");
    }

    #[test]
    fn debug_hides_secret() {
        let auth = parse("username: admin\npassword: secret").unwrap();
        let s = format!("{auth:?}");
        assert!(s.contains("admin"));
        assert!(!s.contains("secret"));
    }

    #[test]
    fn invalid() {
        assert!(parse("user: admin").is_err());
        assert!(parse("password: secret").is_err());
        assert!(parse("user: ''\npassword: x").is_err());
        assert!(parse("token: ''").is_err());
        assert!(parse("token: a\nuser: b\npassword: c").is_err());
        assert!(parse("realm: x").is_err());

        let auth = Authentication::Token("bad\nvalue".to_string());
        assert!(auth.header_value().is_err());
    }
}
