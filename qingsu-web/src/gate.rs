use std::task::{Context, Poll};

use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, HttpResponse};
use chrono::{FixedOffset, NaiveTime, Utc};
use futures::future::{ok, Either, Ready};

/// 闭站窗口：23:00:00（含）到次日 07:00:00（不含）
pub fn in_closed_window(t: NaiveTime) -> bool {
    t >= NaiveTime::from_hms(23, 0, 0) || t < NaiveTime::from_hms(7, 0, 0)
}

/// 静态资源不拦，拦了睡眠页自己就加载不出来了
pub fn is_exempt_path(path: &str) -> bool {
    path.starts_with("/static/") || path.starts_with("/media/")
}

pub struct AccessGate {
    offset: FixedOffset,
}

impl AccessGate {
    pub fn new(offset_hours: i32) -> Self {
        AccessGate {
            offset: FixedOffset::east(offset_hours * 3600),
        }
    }
}

impl<S, B> Transform<S> for AccessGate
where
    S: Service<Request = ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
{
    type Request = ServiceRequest;
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AccessGateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AccessGateMiddleware {
            service,
            offset: self.offset,
        })
    }
}

pub struct AccessGateMiddleware<S> {
    service: S,
    offset: FixedOffset,
}

impl<S, B> Service for AccessGateMiddleware<S>
where
    S: Service<Request = ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
{
    type Request = ServiceRequest;
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Either<S::Future, Ready<Result<Self::Response, Self::Error>>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, req: ServiceRequest) -> Self::Future {
        if is_exempt_path(req.path()) {
            return Either::Left(self.service.call(req));
        }
        let now = Utc::now().with_timezone(&self.offset).time();
        if in_closed_window(now) {
            log::info!("夜间闭站，拒绝 {}", req.path());
            let res = HttpResponse::ServiceUnavailable()
                .json(serde_json::json!({
                    "detail": "系统夜间休眠中，请在 07:00 后访问"
                }))
                .into_body();
            return Either::Right(ok(req.into_response(res)));
        }
        Either::Left(self.service.call(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_boundaries() {
        assert!(in_closed_window(NaiveTime::from_hms(23, 0, 0)));
        assert!(in_closed_window(NaiveTime::from_hms(23, 30, 0)));
        assert!(in_closed_window(NaiveTime::from_hms(0, 0, 0)));
        assert!(in_closed_window(NaiveTime::from_hms(6, 59, 59)));
        assert!(!in_closed_window(NaiveTime::from_hms(7, 0, 0)));
        assert!(!in_closed_window(NaiveTime::from_hms(12, 0, 0)));
        assert!(!in_closed_window(NaiveTime::from_hms(22, 59, 59)));
    }

    #[test]
    fn asset_paths_exempt() {
        assert!(is_exempt_path("/static/app.css"));
        assert!(is_exempt_path("/media/banner.png"));
        assert!(!is_exempt_path("/profile/"));
        assert!(!is_exempt_path("/"));
        assert!(!is_exempt_path("/api/activities/"));
    }
}
