use crate::error::AppError;
use crate::utils::JwtService;
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

// 完全匹配的公开路径
const PUBLIC_EXACT_PATHS: &[&str] = &["/swagger-ui", "/swagger-ui/", "/api-docs/openapi.json"];
// 前缀匹配的公开路径
const PUBLIC_PREFIX_PATHS: &[&str] = &["/swagger-ui/", "/api-docs/", "/api/v1/auth/"];
// 公开前缀下仍需要认证的路径
const AUTH_REQUIRED_PATHS: &[&str] = &["/api/v1/auth/me", "/api/v1/auth/change-password"];

fn is_public_path(path: &str) -> bool {
    if AUTH_REQUIRED_PATHS
        .iter()
        .any(|&excluded| path.starts_with(excluded))
    {
        return false;
    }

    PUBLIC_EXACT_PATHS.contains(&path)
        || PUBLIC_PREFIX_PATHS
            .iter()
            .any(|&prefix| path.starts_with(prefix))
}

pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // 放行所有 CORS 预检请求与公开路径
        if req.method() == Method::OPTIONS || is_public_path(req.path()) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let token = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        let Some(token) = token else {
            let error = AppError::AuthError("Missing access token".to_string());
            return Box::pin(async move { Err(error.into()) });
        };

        match self.jwt_service.verify_access_token(token) {
            Ok(claims) => {
                // 将用户ID添加到请求扩展中
                req.extensions_mut()
                    .insert(claims.sub.parse::<i64>().unwrap_or(0));
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            Err(_) => {
                let error = AppError::AuthError("Invalid access token".to_string());
                Box::pin(async move { Err(error.into()) })
            }
        }
    }
}

/// 用于获取当前用户ID的辅助函数
pub fn get_current_user_id(req: &ServiceRequest) -> Option<i64> {
    req.extensions().get::<i64>().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_public_path() {
        assert!(is_public_path("/api/v1/auth/login"));
        assert!(is_public_path("/api/v1/auth/refresh"));
        assert!(is_public_path("/swagger-ui/index.html"));
        assert!(is_public_path("/api-docs/openapi.json"));

        assert!(!is_public_path("/api/v1/auth/me"));
        assert!(!is_public_path("/api/v1/auth/change-password"));
        assert!(!is_public_path("/api/v1/subscription/plans"));
    }
}
