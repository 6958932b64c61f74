/// Declares a typed web service client.
///
/// Each `fn` line is one contract method: its params (`path` params bound to
/// the `:placeholder` of the same name, at most one `bean` param), its return
/// type, HTTP method and path template. The macro generates the client struct,
/// one `async fn` per method and `contract()`, which describes the same methods
/// for the [`StubGenerator`](crate::stub::StubGenerator).
///
/// ```rust,no_run
/// use serde::{Deserialize, Serialize};
/// use ws_client::{http::HttpClient, service::WebServiceClient};
/// use std::sync::Arc;
///
/// #[derive(Serialize, Deserialize)]
/// pub struct UserView {
///     pub id: u64,
///     pub name: String,
/// }
///
/// #[derive(Serialize, Deserialize)]
/// pub struct CreateUserRequest {
///     pub name: String,
/// }
///
/// ws_client::impl_bean!(UserView, CreateUserRequest);
///
/// ws_client::web_service! {
///     pub struct UserWebServiceClient("UserWebService") {
///         fn get_user(path id: u64) -> Option<UserView> = GET "/user/:id";
///         fn create_user(bean request: CreateUserRequest) -> UserView = POST "/user";
///         fn delete_user(path id: u64) -> () = DELETE "/user/:id";
///     }
/// }
///
/// # async fn example() -> Result<(), anyhow::Error> {
/// let transport = Arc::new(HttpClient::new()?);
/// let client = UserWebServiceClient::new(WebServiceClient::new("http://localhost:8080", transport)?)?;
///
/// let user = client.get_user(1).await?;
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! web_service {
    (@verb GET) => { $crate::http::HttpMethod::Get };
    (@verb POST) => { $crate::http::HttpMethod::Post };
    (@verb PUT) => { $crate::http::HttpMethod::Put };
    (@verb DELETE) => { $crate::http::HttpMethod::Delete };
    (@verb PATCH) => { $crate::http::HttpMethod::Patch };

    (@param path $arg:ident : $ty:ty) => {
        $crate::contract::ParamSpec::path::<$ty>(stringify!($arg))
    };
    (@param bean $arg:ident : $ty:ty) => {
        $crate::contract::ParamSpec::bean::<$ty>(stringify!($arg))
    };

    (@arg $args:ident, path $arg:ident) => {
        $args.path(stringify!($arg), &$arg)?
    };
    (@arg $args:ident, bean $arg:ident) => {
        $args.bean(&$arg)?
    };

    (
        $(#[$meta:meta])*
        $vis:vis struct $client:ident($service:literal) {
            $(
                $(#[$method_meta:meta])*
                fn $method:ident($($kind:ident $arg:ident : $ty:ty),* $(,)?) -> $ret:ty = $verb:ident $path:literal;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone)]
        $vis struct $client {
            stubs: ::std::sync::Arc<$crate::stub::ServiceStubs>,
        }

        impl $client {
            pub fn contract() -> $crate::contract::ServiceContract {
                $crate::contract::ServiceContract::new($service)
                    $(
                        .method(
                            $crate::contract::MethodSpec::new(stringify!($method))
                                .route($crate::web_service!(@verb $verb), $path)
                                $(.param($crate::web_service!(@param $kind $arg : $ty)))*
                                .returns::<$ret>()
                        )
                    )*
            }

            /// Validates the contract and generates the stubs behind this client.
            pub fn new(
                client: $crate::service::WebServiceClient,
            ) -> ::std::result::Result<Self, $crate::contract::ContractError> {
                let stubs = $crate::stub::StubGenerator::new(Self::contract()).build(client)?;
                Ok(Self {
                    stubs: ::std::sync::Arc::new(stubs),
                })
            }

            /// Generates the stubs and hands them to the registry as well.
            pub fn register(
                registry: &mut $crate::stub::ClientRegistry,
                client: $crate::service::WebServiceClient,
            ) -> ::std::result::Result<Self, $crate::contract::ContractError> {
                let stubs = registry.register(Self::contract(), client)?;
                Ok(Self { stubs })
            }

            pub fn stubs(&self) -> &$crate::stub::ServiceStubs {
                &self.stubs
            }

            $(
                $(#[$method_meta])*
                pub async fn $method(
                    &self,
                    $($arg: $ty),*
                ) -> ::std::result::Result<$ret, $crate::service::WebServiceError> {
                    let args = $crate::stub::CallArgs::new();
                    $(let args = $crate::web_service!(@arg args, $kind $arg);)*
                    self.stubs.call(stringify!($method), args).await
                }
            )*
        }
    };
}
