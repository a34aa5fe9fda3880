//! XmlApiClient -- concrete [`EveApiClient`] for the game-data XML API.
//!
//! Issues GET requests against `{base_url}/account/Characters.xml.aspx` and
//! `{base_url}/char/CharacterSheet.xml.aspx` and hands the bodies to the
//! parsers in `drydock-core`.
//!
//! The verification code is a [`SecretString`] and is only exposed when
//! building the query string. It never appears in tracing output.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use drydock_core::client::EveApiClient;
use drydock_core::import::{
    ApiCharacter, CharacterSheet, parse_account_characters, parse_api_character_sheet,
};
use drydock_types::error::ApiError;

const ACCOUNT_CHARACTERS_PATH: &str = "/account/Characters.xml.aspx";
const CHARACTER_SHEET_PATH: &str = "/char/CharacterSheet.xml.aspx";

/// HTTP client for the game-data XML API.
pub struct XmlApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl XmlApiClient {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("drydock/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET an API page and return its body. The API reports its own errors
    /// inside the XML, so only transport failures are treated as errors here.
    async fn fetch(&self, path: &str, query: &[(&str, &str)]) -> Result<String, ApiError> {
        tracing::debug!(path, "calling XML API");
        let response = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.without_url().to_string()))?;

        if status.is_server_error() {
            return Err(ApiError::Transport(format!("server returned {status}")));
        }
        Ok(body)
    }
}

impl EveApiClient for XmlApiClient {
    async fn account_characters(
        &self,
        key_id: &str,
        v_code: &SecretString,
    ) -> Result<Vec<ApiCharacter>, ApiError> {
        let body = self
            .fetch(
                ACCOUNT_CHARACTERS_PATH,
                &[("keyID", key_id), ("vCode", v_code.expose_secret())],
            )
            .await?;
        parse_account_characters(&body)
    }

    async fn character_sheet(
        &self,
        key_id: &str,
        v_code: &SecretString,
        character_id: i64,
    ) -> Result<CharacterSheet, ApiError> {
        let character_id = character_id.to_string();
        let body = self
            .fetch(
                CHARACTER_SHEET_PATH,
                &[
                    ("keyID", key_id),
                    ("vCode", v_code.expose_secret()),
                    ("characterID", character_id.as_str()),
                ],
            )
            .await?;
        parse_api_character_sheet(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response and hand back the request line.
    async fn serve_once(body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();

            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: text/xml\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            request.lines().next().unwrap_or_default().to_string()
        });

        (base_url, handle)
    }

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = XmlApiClient::new("http://localhost:1/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.url(ACCOUNT_CHARACTERS_PATH),
            "http://localhost:1/account/Characters.xml.aspx"
        );
    }

    #[tokio::test]
    async fn test_account_characters_request() {
        let (base_url, server) = serve_once(
            r#"<eveapi version="2"><result><rowset name="characters">
                 <row name="Tess Ting" characterID="42"/>
               </rowset></result></eveapi>"#,
        )
        .await;

        let client = XmlApiClient::new(base_url, Duration::from_secs(5)).unwrap();
        let characters = client
            .account_characters("123", &secret("abc"))
            .await
            .unwrap();
        assert_eq!(characters[0].character_id, 42);

        let request_line = server.await.unwrap();
        assert!(request_line.starts_with("GET /account/Characters.xml.aspx?"));
        assert!(request_line.contains("keyID=123"));
        assert!(request_line.contains("vCode=abc"));
    }

    #[tokio::test]
    async fn test_character_sheet_request() {
        let (base_url, server) = serve_once(
            r#"<eveapi version="2"><result><name>Tess Ting</name>
                 <rowset name="skills"><row typeID="3300" level="4"/></rowset>
               </result></eveapi>"#,
        )
        .await;

        let client = XmlApiClient::new(base_url, Duration::from_secs(5)).unwrap();
        let sheet = client
            .character_sheet("123", &secret("abc"), 42)
            .await
            .unwrap();
        assert_eq!(sheet.name, "Tess Ting");
        assert_eq!(sheet.skills.len(), 1);

        let request_line = server.await.unwrap();
        assert!(request_line.contains("characterID=42"));
    }

    #[tokio::test]
    async fn test_api_error_document() {
        let (base_url, _server) = serve_once(
            r#"<eveapi version="2"><error code="203">Authentication failure.</error></eveapi>"#,
        )
        .await;

        let client = XmlApiClient::new(base_url, Duration::from_secs(5)).unwrap();
        let err = client
            .account_characters("123", &secret("wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Remote { code: 203, .. }));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let client = XmlApiClient::new(base_url, Duration::from_secs(2)).unwrap();
        let err = client
            .account_characters("123", &secret("abc"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
