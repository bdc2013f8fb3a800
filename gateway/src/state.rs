use crate::config::{normalize_proxy_path, Config};

#[derive(Clone)]
pub struct AppState {
    /// Mount path of the forwarding endpoint.
    pub proxy_path: String,
    /// Pooled outbound client shared by every forward.
    pub client: reqwest::Client,
}

impl AppState {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .connect_timeout(config.connect_timeout)
            // Upstream redirects go back to the caller untouched.
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            proxy_path: normalize_proxy_path(&config.proxy_path)?,
            client,
        })
    }
}
