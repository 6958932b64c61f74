use std::fmt::{self, Display};

use crate::contract::ContractError;

macro_rules! http_statuses {
    ($($variant:ident = $code:literal, $reason:literal;)+) => {
        /// Known HTTP statuses. Responses carrying any other code are rejected.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum HttpStatus {
            $($variant,)+
        }

        impl HttpStatus {
            pub fn code(&self) -> u16 {
                match self {
                    $(HttpStatus::$variant => $code,)+
                }
            }

            pub fn reason(&self) -> &'static str {
                match self {
                    $(HttpStatus::$variant => $reason,)+
                }
            }

            pub fn parse(code: u16) -> Result<HttpStatus, ContractError> {
                match code {
                    $($code => Ok(HttpStatus::$variant),)+
                    _ => Err(ContractError::UnsupportedStatus(code)),
                }
            }
        }
    };
}

http_statuses! {
    Continue = 100, "Continue";
    SwitchingProtocols = 101, "Switching Protocols";
    Ok = 200, "OK";
    Created = 201, "Created";
    Accepted = 202, "Accepted";
    NonAuthoritativeInformation = 203, "Non-Authoritative Information";
    NoContent = 204, "No Content";
    ResetContent = 205, "Reset Content";
    PartialContent = 206, "Partial Content";
    MultipleChoices = 300, "Multiple Choices";
    MovedPermanently = 301, "Moved Permanently";
    Found = 302, "Found";
    SeeOther = 303, "See Other";
    NotModified = 304, "Not Modified";
    UseProxy = 305, "Use Proxy";
    TemporaryRedirect = 307, "Temporary Redirect";
    PermanentRedirect = 308, "Permanent Redirect";
    BadRequest = 400, "Bad Request";
    Unauthorized = 401, "Unauthorized";
    PaymentRequired = 402, "Payment Required";
    Forbidden = 403, "Forbidden";
    NotFound = 404, "Not Found";
    MethodNotAllowed = 405, "Method Not Allowed";
    NotAcceptable = 406, "Not Acceptable";
    ProxyAuthenticationRequired = 407, "Proxy Authentication Required";
    RequestTimeout = 408, "Request Timeout";
    Conflict = 409, "Conflict";
    Gone = 410, "Gone";
    LengthRequired = 411, "Length Required";
    PreconditionFailed = 412, "Precondition Failed";
    PayloadTooLarge = 413, "Payload Too Large";
    UriTooLong = 414, "URI Too Long";
    UnsupportedMediaType = 415, "Unsupported Media Type";
    RangeNotSatisfiable = 416, "Range Not Satisfiable";
    ExpectationFailed = 417, "Expectation Failed";
    MisdirectedRequest = 421, "Misdirected Request";
    UnprocessableEntity = 422, "Unprocessable Entity";
    Locked = 423, "Locked";
    FailedDependency = 424, "Failed Dependency";
    UpgradeRequired = 426, "Upgrade Required";
    PreconditionRequired = 428, "Precondition Required";
    TooManyRequests = 429, "Too Many Requests";
    RequestHeaderFieldsTooLarge = 431, "Request Header Fields Too Large";
    UnavailableForLegalReasons = 451, "Unavailable For Legal Reasons";
    InternalServerError = 500, "Internal Server Error";
    NotImplemented = 501, "Not Implemented";
    BadGateway = 502, "Bad Gateway";
    ServiceUnavailable = 503, "Service Unavailable";
    GatewayTimeout = 504, "Gateway Timeout";
    HttpVersionNotSupported = 505, "HTTP Version Not Supported";
    InsufficientStorage = 507, "Insufficient Storage";
    NetworkAuthenticationRequired = 511, "Network Authentication Required";
}

impl HttpStatus {
    /// Statuses below 400 are successful outcomes of a web service call.
    pub fn is_success(&self) -> bool {
        self.code() < 400
    }
}

impl Display for HttpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.reason())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(HttpStatus::parse(200).unwrap(), HttpStatus::Ok);
        assert_eq!(HttpStatus::parse(503).unwrap(), HttpStatus::ServiceUnavailable);
        assert_eq!(HttpStatus::Gone.code(), 410);
        assert_eq!(HttpStatus::NotFound.to_string(), "404 Not Found");
    }

    #[test]
    fn test_parse_standard_statuses() {
        for code in [203, 205, 206, 300, 305, 402, 407, 414, 416, 417, 505] {
            let status = HttpStatus::parse(code).unwrap();
            assert_eq!(status.code(), code);
        }
        assert_eq!(HttpStatus::parse(414).unwrap(), HttpStatus::UriTooLong);
        assert_eq!(HttpStatus::HttpVersionNotSupported.to_string(), "505 HTTP Version Not Supported");
    }

    #[test]
    fn test_parse_unsupported_status() {
        let err = HttpStatus::parse(525).unwrap_err();

        assert!(matches!(err, ContractError::UnsupportedStatus(525)));
        assert_eq!(err.to_string(), "unsupported http status code, code=525");
    }

    #[test]
    fn test_is_success() {
        assert!(HttpStatus::NoContent.is_success());
        assert!(HttpStatus::NotModified.is_success());
        assert!(!HttpStatus::BadRequest.is_success());
    }
}
