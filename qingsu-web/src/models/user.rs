use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
    pub captcha_token: Option<String>,
}

#[derive(Deserialize)]
pub struct TokenInput {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshInput {
    pub refresh: String,
}

#[derive(Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}
