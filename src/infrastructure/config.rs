use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub api: ApiSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub token: String,
    pub business_id: String,
    #[serde(default = "default_reading_limit")]
    pub reading_limit: usize,
}

fn default_reading_limit() -> usize {
    500
}

pub fn load_api_config() -> anyhow::Result<ApiConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/api"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
