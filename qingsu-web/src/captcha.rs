use std::time::Duration;

use serde::Deserialize;

use crate::config::CaptchaConfig;

#[derive(Deserialize)]
struct VerifyResponse {
    success: bool,
}

/// 人机校验服务不可达时按配置决定放行还是拒绝。
/// 放行（fail-open）会削弱校验保证，线上默认如此，但必须留下日志。
pub async fn verify(cfg: &CaptchaConfig, token: &str) -> bool {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            log::warn!("验证码客户端构建失败: {}", e);
            return cfg.fail_open;
        }
    };

    let params = [("secret", cfg.secret_key.as_str()), ("response", token)];
    match client.post(&cfg.verify_url).form(&params).send().await {
        Ok(resp) => match resp.json::<VerifyResponse>().await {
            Ok(v) => v.success,
            Err(e) => {
                log::warn!("验证码响应解析失败: {}", e);
                cfg.fail_open
            }
        },
        Err(e) => {
            log::warn!("验证码服务不可达: {}", e);
            cfg.fail_open
        }
    }
}
