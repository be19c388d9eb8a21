use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::Response,
};

/// Middleware layer answering CORS preflights and stamping the allow
/// origin header onto every response. The API is same-host in normal
/// deployments so everything is allowed.
///
/// `req`  The request to handle
/// `next` The next layer to use
pub async fn cors_layer(req: Request<Body>, next: Next) -> Response {
    let preflight = req.method() == Method::OPTIONS;

    let mut res: Response = if preflight {
        // Preflights are answered here without running the route
        let mut res = Response::default();
        *res.status_mut() = StatusCode::NO_CONTENT;
        res
    } else {
        next.run(req).await
    };

    let headers = res.headers_mut();
    if preflight {
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("*"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("*"),
        );
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    res
}

#[cfg(test)]
mod test {
    use super::cors_layer;
    use axum::{
        body::Body,
        http::{
            header::{
                ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
                ACCESS_CONTROL_ALLOW_ORIGIN,
            },
            Method, Request, StatusCode,
        },
        middleware::from_fn,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async {}))
            .layer(from_fn(cors_layer))
    }

    /// Preflight requests are answered directly with the allow headers
    #[tokio::test]
    async fn test_preflight() {
        let req = Request::builder()
            .uri("/")
            .method(Method::OPTIONS)
            .body(Body::empty())
            .unwrap();
        let res = app().oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let headers = res.headers();
        for name in [
            ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_HEADERS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        ] {
            let value = headers.get(&name).expect("Missing CORS header");
            assert_eq!(value.to_str().unwrap(), "*");
        }
    }

    /// Normal requests run the route and gain the allow origin header
    #[tokio::test]
    async fn test_get() {
        let req = Request::builder()
            .uri("/")
            .method(Method::GET)
            .body(Body::empty())
            .unwrap();
        let res = app().oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);

        let allowed_origin = res
            .headers()
            .get(ACCESS_CONTROL_ALLOW_ORIGIN)
            .expect("Missing allowed origin header");
        assert_eq!(allowed_origin.to_str().unwrap(), "*");
    }
}
