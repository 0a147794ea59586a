use std::future::{ready, Future, Ready};
use std::pin::Pin;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::Error;
use uuid::Uuid;

const REQUEST_ID_HEADER: &str = "x-request-id";

type LocalBoxFuture<T> = Pin<Box<dyn Future<Output = T>>>;

/// Tags every request with an id for log correlation.
///
/// An incoming `X-Request-ID` is honored when it looks sane; otherwise a
/// short generated id is used. The id is echoed on the response.
pub struct RequestId;

fn is_valid_request_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= 64 && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn generate_request_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

impl<S, B> Transform<S, ServiceRequest> for RequestId
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequestIdMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestIdMiddleware { service }))
    }
}

pub struct RequestIdMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestIdMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let request_id = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| is_valid_request_id(v))
            .map(str::to_owned)
            .unwrap_or_else(generate_request_id);

        log::debug!("{} {} [request_id={}]", req.method(), req.path(), request_id);

        let fut = self.service.call(req);
        Box::pin(async move {
            let mut res = fut.await?;
            if let Ok(value) = HeaderValue::from_str(&request_id) {
                res.headers_mut()
                    .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpResponse};

    async fn ping() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    #[actix_web::test]
    async fn echoes_a_valid_incoming_request_id() {
        let app = test::init_service(
            App::new()
                .wrap(RequestId)
                .route("/ping", web::get().to(ping)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/ping")
            .insert_header(("X-Request-ID", "abc-123"))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.headers().get("x-request-id").unwrap(), "abc-123");
    }

    #[actix_web::test]
    async fn replaces_a_malformed_request_id() {
        let app = test::init_service(
            App::new()
                .wrap(RequestId)
                .route("/ping", web::get().to(ping)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/ping")
            .insert_header(("X-Request-ID", "not valid!!"))
            .to_request();
        let res = test::call_service(&app, req).await;

        let echoed = res.headers().get("x-request-id").unwrap().to_str().unwrap();
        assert_ne!(echoed, "not valid!!");
        assert_eq!(echoed.len(), 8);
    }

    #[actix_web::test]
    async fn generates_an_id_when_none_is_sent() {
        let app = test::init_service(
            App::new()
                .wrap(RequestId)
                .route("/ping", web::get().to(ping)),
        )
        .await;

        let req = test::TestRequest::get().uri("/ping").to_request();
        let res = test::call_service(&app, req).await;

        assert!(res.headers().contains_key("x-request-id"));
    }
}
