use serde::Deserialize;
use std::env;
use std::time::Duration;

const DEFAULT_STRATEGIES: &str = "hf-client,hf-raw,ocrspace,ocrspace-fallback";
const DEFAULT_HF_OCR_URL: &str =
    "https://api-inference.huggingface.co/models/microsoft/trocr-base-printed";
const DEFAULT_OCRSPACE_URL: &str = "https://api.ocr.space/parse/image";

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt(var: &str) -> Option<String> {
    env::var(var).ok()
}

fn parse_list(var: &str, default: &str) -> Vec<String> {
    env::var(var)
        .unwrap_or_else(|_| default.to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub ocr: OcrConfig,
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub api_keys: Vec<String>,
    pub max_image_bytes: usize,
}

/// OCR fallback chain. Strategies are attempted in the listed order.
#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    pub strategies: Vec<StrategyConfig>,
    pub timeout_secs: u64,
    pub language: String,
}

impl OcrConfig {
    /// Budget for a single strategy attempt.
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// One configured way of calling a remote OCR service.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StrategyConfig {
    pub name: String,
    pub transport: Transport,
    pub endpoint: String,
    pub api_key: Option<String>,
}

/// How the image is put on the wire.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Transport {
    /// JSON body `{"inputs": "<base64>"}`, as inference client libraries send it.
    JsonBase64,
    /// The encoded image as the raw request body.
    RawBinary,
    /// `multipart/form-data` with a `file` part.
    Multipart,
    /// URL-encoded form with a `base64Image` data URL.
    FormBase64,
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::JsonBase64 => write!(f, "json-base64"),
            Self::RawBinary => write!(f, "raw-binary"),
            Self::Multipart => write!(f, "multipart"),
            Self::FormBase64 => write!(f, "form-base64"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    /// Characters of normalized text kept in the preview.
    pub preview_chars: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { preview_chars: 600 }
    }
}

/// Resolve a named strategy preset against the credentials and endpoints in the environment.
///
/// Known names: `hf-client`, `hf-raw`, `ocrspace`, `ocrspace-fallback`.
fn strategy_preset(name: &str) -> Option<StrategyConfig> {
    let hf = || {
        (
            env::var("HF_OCR_URL").unwrap_or_else(|_| DEFAULT_HF_OCR_URL.to_string()),
            parse_env_opt("HF_API_TOKEN"),
        )
    };
    let ocrspace = || {
        (
            env::var("OCRSPACE_URL").unwrap_or_else(|_| DEFAULT_OCRSPACE_URL.to_string()),
            parse_env_opt("OCRSPACE_API_KEY"),
        )
    };

    let (transport, (endpoint, api_key)) = match name {
        "hf-client" => (Transport::JsonBase64, hf()),
        "hf-raw" => (Transport::RawBinary, hf()),
        "ocrspace" => (Transport::Multipart, ocrspace()),
        "ocrspace-fallback" => (Transport::FormBase64, ocrspace()),
        _ => return None,
    };

    Some(StrategyConfig {
        name: name.to_string(),
        transport,
        endpoint,
        api_key,
    })
}

impl Default for Config {
    fn default() -> Self {
        let strategies = parse_list("OCR_STRATEGIES", DEFAULT_STRATEGIES)
            .into_iter()
            .filter_map(|name| {
                let preset = strategy_preset(&name);
                if preset.is_none() {
                    tracing::warn!("Unknown OCR strategy '{}' in OCR_STRATEGIES, skipping", name);
                }
                preset
            })
            .collect();

        Self {
            server: ServerConfig {
                host: env::var("ALLERSCAN_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("ALLERSCAN_PORT", 7860),
                api_keys: parse_list("ALLERSCAN_API_KEYS", ""),
                max_image_bytes: parse_env_or("ALLERSCAN_MAX_IMAGE_BYTES", 10 * 1024 * 1024),
            },
            ocr: OcrConfig {
                strategies,
                timeout_secs: parse_env_or("OCR_TIMEOUT", 90),
                language: env::var("OCR_LANGUAGE").unwrap_or_else(|_| "eng".to_string()),
            },
            scan: ScanConfig {
                preview_chars: parse_env_or("SCAN_PREVIEW_CHARS", 600),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "OCR_STRATEGIES",
        "OCR_TIMEOUT",
        "OCR_LANGUAGE",
        "HF_API_TOKEN",
        "HF_OCR_URL",
        "OCRSPACE_API_KEY",
        "OCRSPACE_URL",
        "ALLERSCAN_PORT",
        "ALLERSCAN_API_KEYS",
        "SCAN_PREVIEW_CHARS",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();

        let config = Config::from_env();
        assert_eq!(config.server.port, 7860);
        assert!(config.server.api_keys.is_empty());
        assert_eq!(config.ocr.timeout_secs, 90);
        assert_eq!(config.ocr.attempt_timeout(), Duration::from_secs(90));
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.scan.preview_chars, 600);

        let names: Vec<_> = config.ocr.strategies.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["hf-client", "hf-raw", "ocrspace", "ocrspace-fallback"]);
        assert!(config.ocr.strategies.iter().all(|s| s.api_key.is_none()));
    }

    #[test]
    #[serial]
    fn test_strategy_order_and_credentials_from_env() {
        clear_env();
        std::env::set_var("OCR_STRATEGIES", "ocrspace, hf-raw");
        std::env::set_var("OCRSPACE_API_KEY", "space-key");
        std::env::set_var("HF_API_TOKEN", "hf-token");
        std::env::set_var("HF_OCR_URL", "http://localhost:9000/models/ocr");

        let config = Config::from_env();
        let strategies = &config.ocr.strategies;
        assert_eq!(strategies.len(), 2);

        assert_eq!(strategies[0].name, "ocrspace");
        assert_eq!(strategies[0].transport, Transport::Multipart);
        assert_eq!(strategies[0].endpoint, DEFAULT_OCRSPACE_URL);
        assert_eq!(strategies[0].api_key.as_deref(), Some("space-key"));

        assert_eq!(strategies[1].name, "hf-raw");
        assert_eq!(strategies[1].transport, Transport::RawBinary);
        assert_eq!(strategies[1].endpoint, "http://localhost:9000/models/ocr");
        assert_eq!(strategies[1].api_key.as_deref(), Some("hf-token"));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_unknown_strategy_is_skipped() {
        clear_env();
        std::env::set_var("OCR_STRATEGIES", "tesseract,ocrspace");

        let config = Config::from_env();
        assert_eq!(config.ocr.strategies.len(), 1);
        assert_eq!(config.ocr.strategies[0].name, "ocrspace");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_numbers_fall_back_to_defaults() {
        clear_env();
        std::env::set_var("OCR_TIMEOUT", "soon");
        std::env::set_var("ALLERSCAN_PORT", "99999");

        let config = Config::from_env();
        assert_eq!(config.ocr.timeout_secs, 90);
        assert_eq!(config.server.port, 7860);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_api_keys_are_split_and_trimmed() {
        clear_env();
        std::env::set_var("ALLERSCAN_API_KEYS", " one , ,two");

        let config = Config::from_env();
        assert_eq!(config.server.api_keys, vec!["one", "two"]);

        clear_env();
    }

    #[test]
    fn test_transport_display() {
        assert_eq!(Transport::JsonBase64.to_string(), "json-base64");
        assert_eq!(Transport::FormBase64.to_string(), "form-base64");
    }
}
