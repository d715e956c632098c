use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use homebar_client::connection::config::{
    ENV_API_PREFIX, ENV_API_TIMEOUT_MS, ENV_API_URLS, ENV_REDIRECT_POLICY,
};
use homebar_client::{
    ApiResponse, Client, ClientConfig, Method, NoToken, OutboundRequest, StaticToken, TokenStore,
};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "homebar-client")]
#[command(about = "Talk to a replicated Homebar backend with endpoint failover")]
struct Cli {
    /// Comma-separated backend origins (overrides HOMEBAR_API_URLS)
    #[arg(long)]
    urls: Option<String>,

    /// API path prefix (overrides HOMEBAR_API_PREFIX)
    #[arg(long)]
    prefix: Option<String>,

    /// Bearer token
    #[arg(long, env = "HOMEBAR_TOKEN")]
    token: Option<String>,

    /// Per-attempt timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Refuse leader redirects to origins outside the configured list
    #[arg(long)]
    configured_only: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send one request and print the response
    Request {
        method: String,
        path: String,
        /// JSON body
        #[arg(long)]
        data: Option<String>,
        /// Extra header as NAME:VALUE, repeatable
        #[arg(long = "header", short = 'H')]
        headers: Vec<String>,
    },
    /// Probe /health on every configured origin
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;
    let tokens: Arc<dyn TokenStore> = match cli.token.clone() {
        Some(token) => Arc::new(StaticToken(token)),
        None => Arc::new(NoToken),
    };
    let client = Client::with_token_store(config, tokens).context("failed to build client")?;

    match cli.command {
        Command::Request {
            method,
            path,
            data,
            headers,
        } => {
            let request = build_request(&method, &path, data.as_deref(), &headers)?;
            let response = client
                .send(&request)
                .await
                .with_context(|| format!("{} {} failed", method.to_uppercase(), path))?;

            println!("HTTP {}", response.status);
            println!("{}", render_body(&response));
        }
        Command::Health => {
            let mut down = 0;
            for health in client.probe_health().await {
                let state = match health.status {
                    Some(status) if health.is_healthy() => format!("up ({})", status),
                    Some(status) => format!("unhealthy ({})", status),
                    None => {
                        down += 1;
                        "unreachable".to_string()
                    }
                };
                println!("[{}] {} {}", health.index, health.origin, state);
            }
            if down == client.pool().len() {
                bail!("no backend origin is reachable");
            }
        }
    }

    Ok(())
}

fn build_config(cli: &Cli) -> Result<ClientConfig> {
    build_config_with(cli, |key| std::env::var(key).ok())
}

/// Flags shadow the environment key by key; only the merged values are validated.
fn build_config_with<F>(cli: &Cli, env: F) -> Result<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let timeout_ms = cli.timeout_ms.map(|millis| millis.to_string());

    ClientConfig::from_lookup(|key| {
        let flag = match key {
            ENV_API_URLS => cli.urls.clone(),
            ENV_API_PREFIX => cli.prefix.clone(),
            ENV_API_TIMEOUT_MS => timeout_ms.clone(),
            ENV_REDIRECT_POLICY if cli.configured_only => Some("configured".to_string()),
            _ => None,
        };
        flag.or_else(|| env(key))
    })
    .context("invalid client configuration")
}

fn build_request(
    method: &str,
    path: &str,
    data: Option<&str>,
    headers: &[String],
) -> Result<OutboundRequest> {
    let method: Method = method
        .to_uppercase()
        .parse()
        .with_context(|| format!("invalid HTTP method '{}'", method))?;

    let mut request = OutboundRequest::new(method, path);
    if let Some(data) = data {
        let body: serde_json::Value = serde_json::from_str(data).context("--data must be JSON")?;
        request = request.json(body);
    }

    for header in headers {
        let Some((name, value)) = header.split_once(':') else {
            bail!("header '{}' must look like NAME:VALUE", header);
        };
        request = request.header(name.trim(), value.trim());
    }

    Ok(request)
}

fn render_body(response: &ApiResponse) -> String {
    if response.is_json() {
        if let Ok(json) = response.json::<serde_json::Value>() {
            if let Ok(pretty) = serde_json::to_string_pretty(&json) {
                return pretty;
            }
        }
    }
    response.text()
}

#[cfg(test)]
mod tests {
    use super::*;
    use homebar_client::RedirectPolicy;
    use std::collections::HashMap;
    use std::time::Duration;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["homebar-client"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_flags_replace_invalid_environment() {
        let cli = parse(&["--urls", "http://127.0.0.1:9001", "--prefix", "/v2", "health"]);
        let config = build_config_with(
            &cli,
            env(&[(ENV_API_URLS, "not-an-origin"), (ENV_API_PREFIX, "no-slash")]),
        )
        .unwrap();

        assert_eq!(config.origins, vec!["http://127.0.0.1:9001".to_string()]);
        assert_eq!(config.api_prefix, "/v2");
    }

    #[test]
    fn test_environment_fills_missing_flags() {
        let cli = parse(&["--timeout-ms", "250", "health"]);
        let config = build_config_with(
            &cli,
            env(&[
                (ENV_API_URLS, "http://a:1,http://b:2"),
                (ENV_API_PREFIX, "/shop"),
                (ENV_API_TIMEOUT_MS, "9000"),
                (ENV_REDIRECT_POLICY, "configured"),
            ]),
        )
        .unwrap();

        assert_eq!(config.origins, vec!["http://a:1".to_string(), "http://b:2".to_string()]);
        assert_eq!(config.api_prefix, "/shop");
        assert_eq!(config.timeout, Some(Duration::from_millis(250)));
        assert_eq!(config.redirect_policy, RedirectPolicy::ConfiguredOnly);
    }

    #[test]
    fn test_defaults_without_flags_or_environment() {
        let config = build_config_with(&parse(&["health"]), env(&[])).unwrap();

        assert_eq!(config.origins.len(), 3);
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.timeout, None);
        assert_eq!(config.redirect_policy, RedirectPolicy::FollowAny);
    }

    #[test]
    fn test_configured_only_flag_beats_environment() {
        let cli = parse(&["--configured-only", "health"]);
        let config = build_config_with(&cli, env(&[(ENV_REDIRECT_POLICY, "any")])).unwrap();
        assert_eq!(config.redirect_policy, RedirectPolicy::ConfiguredOnly);
    }

    #[test]
    fn test_invalid_environment_without_flag_is_rejected() {
        let cli = parse(&["health"]);
        assert!(build_config_with(&cli, env(&[(ENV_API_URLS, "not-an-origin")])).is_err());
    }

    #[test]
    fn test_build_request() {
        let headers = vec!["X-Trace: abc".to_string(), "Accept:text/plain".to_string()];
        let request =
            build_request("post", "/orders", Some(r#"{"product_id":1}"#), &headers).unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/orders");
        assert_eq!(
            request.headers,
            vec![
                ("X-Trace".to_string(), "abc".to_string()),
                ("Accept".to_string(), "text/plain".to_string()),
            ]
        );
        assert_eq!(
            request.body,
            homebar_client::RequestBody::Json(serde_json::json!({ "product_id": 1 }))
        );
    }

    #[test]
    fn test_build_request_rejects_bad_input() {
        assert!(build_request("get", "/x", None, &["no-colon".to_string()]).is_err());
        assert!(build_request("get", "/x", Some("{not json"), &[]).is_err());
        assert!(build_request("bad method", "/x", None, &[]).is_err());
    }

    #[test]
    fn test_render_body() {
        let json = ApiResponse::new(
            200,
            vec![("content-type".into(), "application/json".into())],
            br#"{"id":42}"#.to_vec(),
        );
        assert_eq!(render_body(&json), "{\n  \"id\": 42\n}");

        let plain = ApiResponse::new(200, vec![], b"ok".to_vec());
        assert_eq!(render_body(&plain), "ok");
    }
}
