use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use ws_client::{
    CallArgs, ClientRegistry, ContractError, Severity, WebServiceClient, WebServiceError,
    config::ClientConfig,
    contract::schema::parse_contract,
    http::{HttpClient, HttpStatus, RequestDescriptor, ResponseOutcome},
    service::{REMOTE_SERVICE_ERROR, RequestIdInterceptor, WebServiceClientInterceptor},
    tracking::ActionStats,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct UserView {
    pub id: u64,
    pub name: String,
    pub status: UserStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Active,
    Inactive,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchUserRequest {
    pub name: Option<String>,
    pub status: Option<UserStatus>,
    pub limit: u32,
}

ws_client::impl_bean!(UserView, CreateUserRequest, SearchUserRequest);
ws_client::impl_wire_enum!(UserStatus);

ws_client::web_service! {
    pub struct UserWebServiceClient("UserWebService") {
        fn get_user(path id: u64) -> Option<UserView> = GET "/user/:id";
        fn search_users(bean request: SearchUserRequest) -> Vec<UserView> = GET "/user";
        fn create_user(bean request: CreateUserRequest) -> UserView = POST "/user";
        fn users_by_status(path status: UserStatus) -> Vec<UserView> = GET "/user/status/:status";
        fn delete_user(path id: u64) -> () = DELETE "/user/:id";
    }
}

#[derive(Default)]
struct CountingInterceptor {
    requests: AtomicUsize,
    responses: AtomicUsize,
}

impl WebServiceClientInterceptor for CountingInterceptor {
    fn on_request(&self, _request: &mut RequestDescriptor) -> anyhow::Result<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_response(&self, _response: &ResponseOutcome) -> anyhow::Result<()> {
        self.responses.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn user_json() -> Value {
    json!({"id": 1, "name": "n", "status": "ACTIVE"})
}

fn http_client(stats: Arc<ActionStats>) -> Arc<HttpClient> {
    let config = ClientConfig {
        retry_base_wait_ms: 10,
        ..ClientConfig::default()
    };
    Arc::new(HttpClient::with_config(&config, stats).unwrap())
}

fn user_client(server: &MockServer) -> UserWebServiceClient {
    let client = WebServiceClient::new(&server.uri(), http_client(ActionStats::new())).unwrap();
    UserWebServiceClient::new(client).unwrap()
}

#[tokio::test]
async fn test_get_with_path_param() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/1"))
        .and(header("user-agent", "ws-client"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(1)
        .mount(&server)
        .await;

    let user = user_client(&server).get_user(1).await.unwrap();

    assert_eq!(
        user,
        Some(UserView {
            id: 1,
            name: "n".to_string(),
            status: UserStatus::Active,
        })
    );
}

#[tokio::test]
async fn test_enum_path_param_uses_wire_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/status/INACTIVE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let users = user_client(&server).users_by_status(UserStatus::Inactive).await.unwrap();

    assert!(users.is_empty());
}

#[tokio::test]
async fn test_get_with_query_bean() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(query_param("name", "a b"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([user_json()])))
        .expect(1)
        .mount(&server)
        .await;

    let users = user_client(&server)
        .search_users(SearchUserRequest {
            name: Some("a b".to_string()),
            status: None,
            limit: 10,
        })
        .await
        .unwrap();

    assert_eq!(users.len(), 1);
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("name=a+b&limit=10"));
}

#[tokio::test]
async fn test_post_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"name": "n"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(user_json()))
        .expect(1)
        .mount(&server)
        .await;

    let user = user_client(&server)
        .create_user(CreateUserRequest { name: "n".to_string() })
        .await
        .unwrap();

    assert_eq!(user.id, 1);
}

#[tokio::test]
async fn test_empty_optional_and_void() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/2"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/user/2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = user_client(&server);

    assert!(client.get_user(2).await.unwrap().is_none());
    client.delete_user(2).await.unwrap();
}

#[tokio::test]
async fn test_remote_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "id": "x",
            "severity": "WARN",
            "errorCode": "NOT_FOUND",
            "message": "not found"
        })))
        .mount(&server)
        .await;

    let err = user_client(&server).get_user(1).await.unwrap_err();

    let WebServiceError::Remote(remote) = err else {
        panic!("expected remote error, got {:?}", err);
    };
    assert_eq!(remote.severity, Severity::Warn);
    assert_eq!(remote.error_code, "NOT_FOUND");
    assert_eq!(remote.message, "not found");
    assert_eq!(remote.status, HttpStatus::NotFound);
}

#[tokio::test]
async fn test_service_unavailable_is_retried_then_classified() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let err = user_client(&server).delete_user(1).await.unwrap_err();

    let remote = err.remote().unwrap();
    assert_eq!(remote.severity, Severity::Error);
    assert_eq!(remote.error_code, REMOTE_SERVICE_ERROR);
    assert_eq!(remote.message, "failed to call remote service, statusCode=503");
}

#[tokio::test]
async fn test_interceptors_run_once_per_call_across_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(header_exists("x-request-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .mount(&server)
        .await;

    let stats = ActionStats::new();
    let counter = Arc::new(CountingInterceptor::default());
    let client = WebServiceClient::new(&server.uri(), http_client(stats.clone()))
        .unwrap()
        .with_interceptor(Arc::new(RequestIdInterceptor))
        .with_interceptor(counter.clone());
    let client = UserWebServiceClient::new(client).unwrap();

    let user = client.get_user(1).await.unwrap();

    assert!(user.is_some());
    assert_eq!(counter.requests.load(Ordering::SeqCst), 1);
    assert_eq!(counter.responses.load(Ordering::SeqCst), 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
    assert_eq!(stats.get("http").unwrap().count, 1);
}

#[tokio::test]
async fn test_unsupported_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(525))
        .mount(&server)
        .await;

    let err = user_client(&server).get_user(1).await.unwrap_err();

    assert!(matches!(
        err,
        WebServiceError::Contract(ContractError::UnsupportedStatus(525))
    ));
}

#[tokio::test]
async fn test_schema_contract_through_registry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(1)
        .mount(&server)
        .await;

    let contract = parse_contract(
        r#"
name = "UserWebService"

[[methods]]
name = "get_user"
method = "GET"
path = "/user/:id"
returns = "Optional<UserView>"
params = [{ name = "id", type = "u64", path = "id" }]
"#,
        config::FileFormat::Toml,
    )
    .unwrap();

    let mut registry = ClientRegistry::new();
    let client = WebServiceClient::new(&server.uri(), http_client(ActionStats::new())).unwrap();
    let stubs = registry.register(contract, client).unwrap();

    let user: Value = stubs
        .call("get_user", CallArgs::new().path("id", &7).unwrap())
        .await
        .unwrap();

    assert_eq!(user, user_json());
    let Err(err) = registry.register(UserWebServiceClient::contract(), user_web_client(&server)) else {
        panic!("expected duplicate registration to fail");
    };
    assert!(matches!(err, ContractError::ServiceAlreadyRegistered(_)));
}

fn user_web_client(server: &MockServer) -> WebServiceClient {
    WebServiceClient::new(&server.uri(), http_client(ActionStats::new())).unwrap()
}
