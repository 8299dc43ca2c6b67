//! HTTP fetch adapter against a mock Restful Objects server

use ro_dispatch::config::{DispatcherConfig, FetchSection};
use ro_dispatch::dispatch::Dispatcher;
use ro_dispatch::protocol::{HttpMethod, ProcessingState, ReprType};
use ro_dispatch::testing::fixtures::OBJECT_BODY;
use ro_dispatch::transport::{FetchError, HttpFetcher};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetch_section(server: &MockServer) -> FetchSection {
    FetchSection {
        base_url: format!("{}/restful/", server.uri()),
        ..FetchSection::default()
    }
}

#[tokio::test]
async fn test_fetch_builds_envelope_from_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/restful/objects/demo.JavaLangStringEntity/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(OBJECT_BODY, &ReprType::Object.content_type()),
        )
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&fetch_section(&server)).unwrap();
    let mut envelope = fetcher
        .get("objects/demo.JavaLangStringEntity/1")
        .await
        .unwrap();

    assert_eq!(envelope.status(), 200);
    assert_eq!(envelope.repr_type(), Some(ReprType::Object));
    assert_eq!(envelope.body(), OBJECT_BODY.as_bytes());

    Dispatcher::default().dispatch(&mut envelope);
    assert!(matches!(
        envelope.state(),
        ProcessingState::Processed { handler } if handler == "object"
    ));
}

#[tokio::test]
async fn test_error_status_is_a_response_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/restful/user"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&fetch_section(&server)).unwrap();
    let mut envelope = fetcher.get("user").await.unwrap();
    assert_eq!(envelope.status(), 401);

    Dispatcher::default().dispatch(&mut envelope);
    assert_eq!(envelope.state().handler(), Some("http-401"));
}

#[tokio::test]
async fn test_basic_auth_is_sent() {
    let server = MockServer::start().await;
    // sven:pass
    Mock::given(method("GET"))
        .and(path("/restful/user"))
        .and(header("authorization", "Basic c3ZlbjpwYXNz"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                r#"{"userName": "sven", "roles": [], "links": []}"#,
                &ReprType::User.content_type(),
            ),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&fetch_section(&server))
        .unwrap()
        .with_credentials("sven".to_string(), Some("pass".to_string()));

    let envelope = fetcher.get("user").await.unwrap();
    assert_eq!(envelope.status(), 200);
}

#[tokio::test]
async fn test_oversized_response_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/restful/objects/demo.Big/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(2048)))
        .mount(&server)
        .await;

    let section = FetchSection {
        max_response_bytes: 1024,
        ..fetch_section(&server)
    };
    let fetcher = HttpFetcher::new(&section).unwrap();

    let result = fetcher.get("objects/demo.Big/1").await;
    assert!(matches!(
        result,
        Err(FetchError::ResponseTooLarge { max: 1024, .. })
    ));
}

#[tokio::test]
async fn test_post_method_is_used() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/restful/services/demo.Menu/actions/create/invoke"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                r#"{"resultType": "void"}"#,
                &ReprType::ActionResult.content_type(),
            ),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&fetch_section(&server)).unwrap();
    let mut envelope = fetcher
        .fetch(HttpMethod::Post, "services/demo.Menu/actions/create/invoke")
        .await
        .unwrap();
    assert_eq!(envelope.method(), HttpMethod::Post);

    Dispatcher::default().dispatch(&mut envelope);
    assert_eq!(envelope.state().handler(), Some("result-value"));
}

#[tokio::test]
async fn test_from_config_requires_configured_password() {
    let mut config = DispatcherConfig::default();
    config.fetch.username_env = Some("RO_DISPATCH_FETCH_TEST_USER".to_string());
    config.fetch.password_env = Some("RO_DISPATCH_FETCH_TEST_UNSET".to_string());

    assert!(matches!(
        HttpFetcher::from_config(&config),
        Err(FetchError::Config(_))
    ));
}
