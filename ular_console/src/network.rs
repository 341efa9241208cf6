// Blocking HTTP transport for the terminal client.

use std::time::Duration;

use log::{debug, warn};
use ular_client::protocol::ApiRequest;
use url::Url;


pub struct HttpTransport {
    http: reqwest::blocking::Client,
    server: Url,
    api_prefix: String,
}

impl HttpTransport {
    pub fn new(server: Url, api_prefix: String, timeout: Duration) -> reqwest::Result<Self> {
        let http = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        Ok(HttpTransport { http, server, api_prefix })
    }

    pub fn url(&self, request: &ApiRequest) -> Result<Url, url::ParseError> {
        request.to_url(&self.server, &self.api_prefix)
    }

    // Returns the reply body, or a description of why there is none. HTTP error codes are not
    // failures here: the server explains them in the body.
    pub fn perform(&self, request: &ApiRequest) -> Result<String, String> {
        let url = self.url(request).map_err(|err| err.to_string())?;
        debug!("GET {}", url);
        let response = self.http.get(url.clone()).send().map_err(|err| err.to_string())?;
        if !response.status().is_success() {
            warn!("GET {} returned {}", url, response.status());
        }
        response.text().map_err(|err| err.to_string())
    }
}

// Accepts "host:port" as well as full URLs.
pub fn parse_server_url(address: &str) -> Result<Url, url::ParseError> {
    let address = address.trim();
    if address.contains("://") {
        Url::parse(address)
    } else {
        Url::parse(&format!("http://{}", address))
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn server_address_without_scheme() {
        assert_eq!(parse_server_url("localhost:5000").unwrap().as_str(), "http://localhost:5000/");
        assert_eq!(
            parse_server_url("https://ular.example.org").unwrap().as_str(),
            "https://ular.example.org/"
        );
    }

    #[test]
    fn request_url() {
        let transport = HttpTransport::new(
            parse_server_url("localhost:5000").unwrap(),
            "/api/ular/".to_owned(),
            Duration::from_secs(1),
        )
        .unwrap();
        let request = ApiRequest::RollDice { code: "ABCD".to_owned(), player: "Ana Bo".to_owned() };
        assert_eq!(
            transport.url(&request).unwrap().as_str(),
            "http://localhost:5000/api/ular/rolldice?code=ABCD&player=Ana+Bo"
        );
    }
}
