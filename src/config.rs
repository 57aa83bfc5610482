use std::{net::SocketAddr, path::Path};

use serde_json::Value;

use crate::{api::AuthMode, AppResult, GetField};

const DEFAULT_BIND: &str = "0.0.0.0:8080";
const DEFAULT_SESSION_MINUTES: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// Hosted auth domain of the user pool, with scheme.
    pub domain: String,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub graphql_endpoint: String,
    pub api_key: Option<String>,
    pub auth: AuthConfig,
    pub bind: SocketAddr,
    pub session_minutes: i64,
}

/// Values from an Amplify-style exports file, all optional.
#[derive(Debug, Default)]
struct Exports {
    graphql_endpoint: Option<String>,
    api_key: Option<String>,
    client_id: Option<String>,
    domain: Option<String>,
    redirect_url: Option<String>,
}

impl Exports {
    fn from_json(json: &Value) -> Exports {
        let oauth = json.get_obj_field("oauth").ok();
        Exports {
            graphql_endpoint: json.get_str_field("aws_appsync_graphqlEndpoint").ok(),
            api_key: json.get_str_field("aws_appsync_apiKey").ok(),
            client_id: json.get_str_field("aws_user_pools_web_client_id").ok(),
            domain: oauth.and_then(|o| o.get_str_field("domain").ok()),
            redirect_url: oauth.and_then(|o| o.get_str_field("redirectSignIn").ok()),
        }
    }
}

impl Config {
    /// Reads `.env`, then the optional exports file named by
    /// `LIVECHAT_EXPORTS`, then the `LIVECHAT_*` variables, later sources
    /// winning.
    pub fn load() -> AppResult<Config> {
        dotenv::dotenv().ok();

        let exports = match dotenv::var("LIVECHAT_EXPORTS") {
            Ok(path) => Exports::from_json(&read_json(Path::new(&path))?),
            Err(_) => Exports::default(),
        };
        Config::resolve(exports, |key| dotenv::var(key).ok())
    }

    fn resolve(exports: Exports, var: impl Fn(&str) -> Option<String>) -> AppResult<Config> {
        let required = |key: &str, fallback: Option<String>| -> AppResult<String> {
            var(key)
                .or(fallback)
                .ok_or_else(|| format!("{key} is not set").into())
        };

        let domain = required("LIVECHAT_AUTH_DOMAIN", exports.domain)?;
        let domain = if domain.starts_with("http://") || domain.starts_with("https://") {
            domain
        } else {
            format!("https://{domain}")
        };

        let bind = var("LIVECHAT_BIND")
            .unwrap_or_else(|| DEFAULT_BIND.to_owned())
            .parse()
            .map_err(|e| format!("LIVECHAT_BIND: {e}"))?;
        let session_minutes = match var("LIVECHAT_SESSION_MINUTES") {
            Some(minutes) => minutes
                .parse()
                .map_err(|e| format!("LIVECHAT_SESSION_MINUTES: {e}"))?,
            None => DEFAULT_SESSION_MINUTES,
        };

        Ok(Config {
            graphql_endpoint: required("LIVECHAT_GRAPHQL_ENDPOINT", exports.graphql_endpoint)?,
            api_key: var("LIVECHAT_API_KEY").or(exports.api_key),
            auth: AuthConfig {
                domain,
                client_id: required("LIVECHAT_CLIENT_ID", exports.client_id)?,
                client_secret: var("LIVECHAT_CLIENT_SECRET"),
                redirect_url: required("LIVECHAT_REDIRECT_URL", exports.redirect_url)?,
            },
            bind,
            session_minutes,
        })
    }

    /// Credentials for the push channel: the API key when there is one.
    pub fn push_auth(&self) -> Option<AuthMode> {
        self.api_key.clone().map(AuthMode::ApiKey)
    }
}

fn read_json(path: &Path) -> AppResult<Value> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn exports_file_fills_everything() {
        let exports = Exports::from_json(&json!({
            "aws_appsync_graphqlEndpoint": "https://api.example/graphql",
            "aws_appsync_apiKey": "da2-key",
            "aws_user_pools_web_client_id": "client-1",
            "oauth": {
                "domain": "chat.auth.eu-west-1.amazoncognito.com",
                "redirectSignIn": "http://localhost:8080/lockin",
            },
        }));
        let config = Config::resolve(exports, vars(&[])).unwrap();

        assert_eq!(config.graphql_endpoint, "https://api.example/graphql");
        assert_eq!(config.auth.domain, "https://chat.auth.eu-west-1.amazoncognito.com");
        assert_eq!(config.push_auth(), Some(AuthMode::ApiKey("da2-key".into())));
        assert_eq!(config.bind, DEFAULT_BIND.parse().unwrap());
        assert_eq!(config.session_minutes, DEFAULT_SESSION_MINUTES);
    }

    #[test]
    fn environment_overrides_exports() {
        let exports = Exports {
            graphql_endpoint: Some("https://old/graphql".into()),
            ..Exports::default()
        };
        let config = Config::resolve(
            exports,
            vars(&[
                ("LIVECHAT_GRAPHQL_ENDPOINT", "https://new/graphql"),
                ("LIVECHAT_AUTH_DOMAIN", "http://localhost:9229"),
                ("LIVECHAT_CLIENT_ID", "client-2"),
                ("LIVECHAT_REDIRECT_URL", "http://localhost:8080/lockin"),
                ("LIVECHAT_BIND", "127.0.0.1:3000"),
            ]),
        )
        .unwrap();

        assert_eq!(config.graphql_endpoint, "https://new/graphql");
        assert_eq!(config.auth.domain, "http://localhost:9229");
        assert_eq!(config.push_auth(), None);
        assert_eq!(config.bind.port(), 3000);
    }

    #[test]
    fn missing_endpoint_is_an_error() {
        let err = Config::resolve(
            Exports::default(),
            vars(&[
                ("LIVECHAT_AUTH_DOMAIN", "https://auth"),
                ("LIVECHAT_CLIENT_ID", "c"),
                ("LIVECHAT_REDIRECT_URL", "http://localhost/lockin"),
            ]),
        )
        .unwrap_err();
        assert!(err.0.to_string().contains("LIVECHAT_GRAPHQL_ENDPOINT"));
    }
}
