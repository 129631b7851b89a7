use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::conversion::PayloadDefaults;
use crate::error::AdapterError;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";
pub const DEFAULT_MAX_TOKENS: u32 = 800;
pub const DEFAULT_PORT: u16 = 10000;
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Upstream inference provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Groq,
    OpenAi,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Groq => "groq",
            Provider::OpenAi => "openai",
        }
    }

    /// Chat Completions endpoint.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Provider::Groq => "https://api.groq.com/openai/v1/chat/completions",
            Provider::OpenAi => "https://api.openai.com/v1/chat/completions",
        }
    }

    /// Environment variable holding this provider's credential.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Provider::Groq => "GROQ_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Groq => "llama-3.1-8b-instant",
            Provider::OpenAi => "gpt-4o-mini",
        }
    }

    pub fn fallback_models(&self) -> &'static [&'static str] {
        match self {
            Provider::Groq => &["llama-3.3-70b-versatile"],
            Provider::OpenAi => &["gpt-4.1-mini"],
        }
    }

    pub fn default_temperature(&self) -> f64 {
        match self {
            Provider::Groq => 0.2,
            Provider::OpenAi => 0.7,
        }
    }
}

impl FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "groq" => Ok(Provider::Groq),
            "openai" | "open-ai" | "open_ai" => Ok(Provider::OpenAi),
            other => Err(anyhow!("unknown provider '{other}' (expected groq or openai)")),
        }
    }
}

/// Process-wide settings, built once at start-up and shared read-only.
#[derive(Clone)]
pub struct Config {
    pub provider: Provider,
    /// Bearer credential for the upstream. Absence fails each request, not start-up.
    pub api_key: Option<String>,
    pub upstream_url: String,
    pub bind_host: String,
    pub port: u16,
    pub default_model: String,
    pub fallback_models: Vec<String>,
    pub default_temperature: f64,
    pub default_max_tokens: u32,
    pub system_prompt: String,
    /// User text used when nothing can be extracted from the body.
    pub fallback_prompt: Option<String>,
    pub http_timeout: Option<Duration>,
    pub proxy_url: Option<String>,
    pub no_proxy: bool,
    pub body_limit_bytes: usize,
    /// Empty means any origin.
    pub cors_allowed_origins: Vec<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("upstream_url", &self.upstream_url)
            .field("bind_host", &self.bind_host)
            .field("port", &self.port)
            .field("default_model", &self.default_model)
            .field("fallback_models", &self.fallback_models)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("fallback_prompt", &self.fallback_prompt.is_some())
            .field("http_timeout", &self.http_timeout)
            .field("no_proxy", &self.no_proxy)
            .field("body_limit_bytes", &self.body_limit_bytes)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Provider defaults with no credential.
    pub fn for_provider(provider: Provider) -> Self {
        Self {
            provider,
            api_key: None,
            upstream_url: provider.endpoint().to_string(),
            bind_host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            default_model: provider.default_model().to_string(),
            fallback_models: provider
                .fallback_models()
                .iter()
                .map(|m| m.to_string())
                .collect(),
            default_temperature: provider.default_temperature(),
            default_max_tokens: DEFAULT_MAX_TOKENS,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            fallback_prompt: None,
            http_timeout: None,
            proxy_url: None,
            no_proxy: false,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
            cors_allowed_origins: Vec::new(),
        }
    }

    /// Read configuration from the process environment.
    ///
    /// Call after `util::init_tracing` so `.env` files have been applied.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Blank values count as unset. Malformed numbers are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let provider = match get("UPSTREAM_PROVIDER") {
            Some(p) => p.parse::<Provider>().context("UPSTREAM_PROVIDER")?,
            None => Provider::Groq,
        };
        let mut cfg = Self::for_provider(provider);

        cfg.api_key = get("UPSTREAM_API_KEY").or_else(|| get(provider.api_key_var()));
        if let Some(url) = get("UPSTREAM_URL") {
            cfg.upstream_url = url;
        }
        if let Some(host) = get("BIND_ADDR") {
            cfg.bind_host = host;
        }
        if let Some(port) = get("PORT") {
            cfg.port = port
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got '{port}'"))?;
        }
        if let Some(model) = get("DEFAULT_MODEL") {
            cfg.default_model = model;
        }
        if let Some(list) = get("FALLBACK_MODELS") {
            cfg.fallback_models = split_list(&list);
        }
        if let Some(t) = get("DEFAULT_TEMPERATURE") {
            cfg.default_temperature = t
                .parse::<f64>()
                .with_context(|| format!("DEFAULT_TEMPERATURE must be a number, got '{t}'"))?;
        }
        if let Some(n) = get("DEFAULT_MAX_TOKENS") {
            cfg.default_max_tokens = n
                .parse::<u32>()
                .with_context(|| format!("DEFAULT_MAX_TOKENS must be an integer, got '{n}'"))?;
        }
        if let Some(prompt) = get("SYSTEM_PROMPT") {
            cfg.system_prompt = prompt;
        }
        cfg.fallback_prompt = get("FALLBACK_PROMPT");
        if let Some(secs) = get("HTTP_TIMEOUT_SECONDS") {
            let n = secs
                .parse::<u64>()
                .with_context(|| format!("HTTP_TIMEOUT_SECONDS must be an integer, got '{secs}'"))?;
            cfg.http_timeout = Some(Duration::from_secs(n));
        }
        cfg.proxy_url = get("PROXY_URL");
        cfg.no_proxy = get("NO_PROXY_ALL").map(|v| is_truthy(&v)).unwrap_or(false);
        if let Some(n) = get("BODY_LIMIT_BYTES") {
            cfg.body_limit_bytes = n
                .parse::<usize>()
                .with_context(|| format!("BODY_LIMIT_BYTES must be an integer, got '{n}'"))?;
        }
        if let Some(origins) = get("CORS_ALLOWED_ORIGINS") {
            if origins != "*" {
                cfg.cors_allowed_origins = split_list(&origins);
            }
        }

        Ok(cfg)
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_upstream_url(mut self, url: impl Into<String>) -> Self {
        self.upstream_url = url.into();
        self
    }

    pub fn with_models(mut self, default_model: &str, fallbacks: &[&str]) -> Self {
        self.default_model = default_model.to_string();
        self.fallback_models = fallbacks.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }

    /// The upstream credential, or the per-request configuration error.
    pub fn require_api_key(&self) -> Result<&str, AdapterError> {
        self.api_key.as_deref().ok_or_else(|| {
            AdapterError::Configuration(format!(
                "{} not set on server",
                self.provider.api_key_var()
            ))
        })
    }

    /// Ordered, de-duplicated model candidates for one request.
    ///
    /// The caller's model comes first, then the default, then the fallback list.
    pub fn candidate_models(&self, requested: Option<&str>) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let configured = std::iter::once(self.default_model.as_str())
            .chain(self.fallback_models.iter().map(String::as_str));
        for m in requested.into_iter().chain(configured) {
            let m = m.trim();
            if !m.is_empty() && !out.iter().any(|seen| seen == m) {
                out.push(m.to_string());
            }
        }
        out
    }

    pub fn payload_defaults(&self) -> PayloadDefaults<'_> {
        PayloadDefaults {
            system_prompt: &self.system_prompt,
            temperature: self.default_temperature,
            max_tokens: self.default_max_tokens,
        }
    }
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_truthy(v: &str) -> bool {
    let v = v.trim().to_ascii_lowercase();
    v == "1" || v == "true" || v == "yes" || v == "on"
}
