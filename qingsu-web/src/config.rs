use std::env;

/// 启动时装配一次，经 web::Data 下发，不读全局
#[derive(Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database_url: String,
    pub secret_key: String,
    pub debug: bool,
    pub trusted_origins: Vec<String>,
    /// 部署时区相对 UTC 的小时偏移，默认东八区
    pub tz_offset_hours: i32,
    pub captcha: Option<CaptchaConfig>,
}

#[derive(Clone)]
pub struct CaptchaConfig {
    pub site_key: String,
    pub secret_key: String,
    pub verify_url: String,
    pub timeout_secs: u64,
    pub fail_open: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            bind_addr: var_or("BIND_ADDR", "0.0.0.0:8000"),
            database_url: database_url(),
            secret_key: env::var("SECRET_KEY").expect("Can't get SECRET_KEY"),
            debug: flag("DEBUG", false),
            trusted_origins: list("TRUSTED_ORIGINS"),
            tz_offset_hours: var_or("TZ_OFFSET_HOURS", "8")
                .parse()
                .expect("Bad TZ_OFFSET_HOURS"),
            captcha: captcha_config(),
        }
    }
}

/// DATABASE_URL 优先，否则按 DB_* 散件拼接
fn database_url() -> String {
    if let Ok(url) = env::var("DATABASE_URL") {
        return url;
    }
    format!(
        "postgres://{}:{}@{}:{}/{}",
        var_or("DB_USER", "postgres"),
        var_or("DB_PASS", ""),
        var_or("DB_HOST", "localhost"),
        var_or("DB_PORT", "5432"),
        env::var("DB_NAME").expect("Can't get DB_NAME or DATABASE_URL"),
    )
}

/// DB_NAME 在线上环境才会配置，同时作为验证码开关的环境判别
fn captcha_config() -> Option<CaptchaConfig> {
    if env::var("DB_NAME").is_err() {
        return None;
    }
    let secret = env::var("CAPTCHA_SECRET_KEY").ok()?;
    Some(CaptchaConfig {
        site_key: var_or("CAPTCHA_SITE_KEY", ""),
        secret_key: secret,
        verify_url: var_or(
            "CAPTCHA_VERIFY_URL",
            "https://hcaptcha.com/siteverify",
        ),
        timeout_secs: var_or("CAPTCHA_TIMEOUT_SECS", "3")
            .parse()
            .expect("Bad CAPTCHA_TIMEOUT_SECS"),
        fail_open: flag("CAPTCHA_FAIL_OPEN", true),
    })
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => matches!(v.as_str(), "1" | "true" | "True" | "yes"),
        Err(_) => default,
    }
}

fn list(key: &str) -> Vec<String> {
    env::var(key)
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
