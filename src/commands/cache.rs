//! Edge/browser cache and asset acceleration

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::{extract, ApiClient};
use crate::cli::{CacheAction, CacheCommand, ImageAction};
use crate::output::Output;
use crate::types::NumericBool;

use super::{domain_path, on_off, or_dash, Toggle, TtlBody};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub cache_mode: String,
    pub cache_ttl: u32,
    pub developer_mode: NumericBool,
    pub always_online: NumericBool,
    pub cache_cookies: NumericBool,
    pub browser_cache_mode: String,
    pub browser_cache_ttl: u32,
    pub errors_cache_ttl: u32,
    pub minify_html: NumericBool,
    pub minify_css: NumericBool,
    pub minify_js: NumericBool,
    pub image_optimization: NumericBool,
}

#[derive(Debug, Serialize)]
struct CacheMode<'a> {
    mode: &'a str,
}

#[derive(Debug, Serialize)]
struct ModeTtl<'a> {
    mode: &'a str,
    ttl: u32,
}

/// Either `purge_all` or `urls` is set, never both
#[derive(Debug, Serialize)]
struct Purge<'a> {
    domain_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    purge_all: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    urls: Option<&'a [String]>,
}

impl<'a> Purge<'a> {
    fn new(domain_id: u64, all: bool, urls: &'a [String]) -> Self {
        if all {
            Self {
                domain_id,
                purge_all: Some(true),
                urls: None,
            }
        } else {
            Self {
                domain_id,
                purge_all: None,
                urls: Some(urls),
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct Minify {
    html: bool,
    css: bool,
    js: bool,
}

#[derive(Debug, Serialize)]
struct Webp {
    webp: bool,
}

fn cache_path(domain: u64, suffix: &str) -> String {
    domain_path(domain, &format!("cache/{}", suffix))
}

pub async fn run(cmd: CacheCommand, client: &ApiClient, out: &Output) -> Result<()> {
    match cmd.action {
        CacheAction::Status { target } => {
            let settings: CacheSettings =
                extract(&client.get(&domain_path(target.domain, "cache")).await?)?;
            out.detail(&settings, &status_fields(&settings));
        }
        CacheAction::Mode { target, mode } => {
            client
                .post(
                    &cache_path(target.domain, "edge/change-mode"),
                    &CacheMode { mode: &mode },
                )
                .await?;
            out.done(&format!("Cache mode set to {}", mode));
        }
        CacheAction::Ttl { target, mode, ttl } => {
            client
                .post(
                    &cache_path(target.domain, "edge/change-ttl"),
                    &ModeTtl { mode: &mode, ttl },
                )
                .await?;
            out.done(&format!("Cache TTL set to {} seconds (mode: {})", ttl, mode));
        }
        CacheAction::Browser { target, mode, ttl } => {
            client
                .post(
                    &cache_path(target.domain, "browser/change-mode"),
                    &ModeTtl { mode: &mode, ttl },
                )
                .await?;
            out.done(&format!("Browser cache set (mode: {}, TTL: {})", mode, ttl));
        }
        CacheAction::ErrorsTtl { target, ttl } => {
            client
                .post(&cache_path(target.domain, "errors/cache-ttl"), &TtlBody { ttl })
                .await?;
            out.done(&format!("Error responses cache TTL set to {} seconds", ttl));
        }
        CacheAction::AlwaysOnline { target, switch } => {
            client
                .post(
                    &cache_path(target.domain, "edge/always-online"),
                    &Toggle {
                        enabled: switch.enabled,
                    },
                )
                .await?;
            out.done(&format!("Always online {}", on_off(switch.enabled)));
        }
        CacheAction::CacheCookies { target, switch } => {
            client
                .post(
                    &cache_path(target.domain, "edge/cache-cookies"),
                    &Toggle {
                        enabled: switch.enabled,
                    },
                )
                .await?;
            out.done(&format!("Cookie caching {}", on_off(switch.enabled)));
        }
        CacheAction::DevMode { target, switch } => {
            client
                .post(
                    &cache_path(target.domain, "edge/developer-mode"),
                    &Toggle {
                        enabled: switch.enabled,
                    },
                )
                .await?;
            out.done(&format!("Developer mode {}", on_off(switch.enabled)));
        }
        CacheAction::Purge { target, urls, all } => {
            let body = Purge::new(target.domain, all, &urls);
            out.log("debug", &format!("Purging cache for domain {}", target.domain));
            client
                .post(&cache_path(target.domain, "edge/purge-cache"), &body)
                .await?;
            if all {
                out.done("All cache purged");
            } else {
                out.done(&format!("Purged {} URL(s)", urls.len()));
            }
        }
        CacheAction::Minify {
            target,
            html,
            css,
            js,
        } => {
            client
                .post(
                    &domain_path(target.domain, "acceleration/assets/minify"),
                    &Minify { html, css, js },
                )
                .await?;
            out.done(&format!(
                "Minification updated (HTML: {}, CSS: {}, JS: {})",
                html, css, js
            ));
        }
        CacheAction::Image(image) => match image.action {
            ImageAction::Webp { target, switch } => {
                client
                    .post(
                        &domain_path(target.domain, "acceleration/images/optimize"),
                        &Webp {
                            webp: switch.enabled,
                        },
                    )
                    .await?;
                out.done(&format!("WebP conversion {}", on_off(switch.enabled)));
            }
            ImageAction::Resize { target, switch } => {
                client
                    .post(
                        &domain_path(target.domain, "acceleration/images/resize"),
                        &Toggle {
                            enabled: switch.enabled,
                        },
                    )
                    .await?;
                out.done(&format!("Image resizing {}", on_off(switch.enabled)));
            }
        },
    }
    Ok(())
}

fn status_fields(s: &CacheSettings) -> Vec<(&'static str, String)> {
    vec![
        ("Edge Mode", or_dash(&s.cache_mode)),
        ("Edge TTL", format!("{} seconds", s.cache_ttl)),
        ("Developer Mode", s.developer_mode.to_string()),
        ("Always Online", s.always_online.to_string()),
        ("Cache Cookies", s.cache_cookies.to_string()),
        ("Browser Mode", or_dash(&s.browser_cache_mode)),
        ("Browser TTL", format!("{} seconds", s.browser_cache_ttl)),
        ("Errors TTL", format!("{} seconds", s.errors_cache_ttl)),
        ("Minify HTML", s.minify_html.to_string()),
        ("Minify CSS", s.minify_css.to_string()),
        ("Minify JS", s.minify_js.to_string()),
        ("Image Optimization", s.image_optimization.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn purge_all_omits_urls() {
        let body = Purge::new(12, true, &[]);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"domain_id": 12, "purge_all": true})
        );
    }

    #[test]
    fn purge_urls_omits_flag() {
        let urls = vec!["https://example.com/app.js".to_string()];
        let body = Purge::new(12, false, &urls);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"domain_id": 12, "urls": ["https://example.com/app.js"]})
        );
    }

    #[test]
    fn settings_decode_numeric_flags() {
        let settings: CacheSettings = serde_json::from_value(json!({
            "cache_mode": "aggressive",
            "cache_ttl": 86400,
            "developer_mode": 0,
            "always_online": 1,
            "minify_js": "1"
        }))
        .unwrap();
        assert!(!settings.developer_mode.get());
        assert!(settings.always_online.get());
        assert!(settings.minify_js.get());

        let fields = status_fields(&settings);
        assert_eq!(fields[0], ("Edge Mode", "aggressive".to_string()));
    }
}
