use self::repos::*;
use super::{error::Error, responses::Repository};
use crate::app::GitHubClient;
use async_trait::async_trait;
use http::{
    header::{ACCEPT, AUTHORIZATION, USER_AGENT},
    HeaderMap, HeaderValue, Method,
};
use reqwest::{Client, ClientBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

type ClientResult<T> = Result<T, Error>;

const DEFAULT_BASE_URL: &str = "https://api.github.com/";

/// Applies to every request, there is no per-call override.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// [GitHub REST authentication methods](https://docs.github.com/en/rest/overview/authenticating-to-the-rest-api).
///
/// [HTTP authorization on MDN](https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Authorization).
///
pub trait Authentication {
    /// Encode authentication into HTTP authorization header.
    fn to_authz_value(&self) -> String;
}

#[derive(Clone, Debug)]
pub struct GhClient {
    base_url: Url,
    http: Client,
}

impl GhClient {
    pub fn new(
        base_url: impl Into<Option<Url>>,
        token: &impl Authentication,
    ) -> ClientResult<Self> {
        let base_url: Url =
            base_url.into().map(Result::Ok).unwrap_or_else(|| DEFAULT_BASE_URL.parse())?;

        let headers = {
            let mut headers = HeaderMap::new();

            let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            headers.insert(USER_AGENT, HeaderValue::from_str(&user_agent)?);

            let mut authorization: HeaderValue = token.to_authz_value().try_into()?;
            authorization.set_sensitive(true);
            headers.insert(AUTHORIZATION, authorization);

            headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

            headers
        };

        let http = ClientBuilder::new().default_headers(headers).timeout(REQUEST_TIMEOUT).build()?;

        let client = GhClient { base_url, http };
        debug!(?client);

        Ok(client)
    }

    fn build_url(&self, path: &str) -> ClientResult<Url> {
        // keeps a path prefix such as GitHub Enterprise's `/api/v3`
        let base = self.base_url.as_str().trim_end_matches('/');
        let url = format!("{base}{path}").parse()?;
        Ok(url)
    }

    /// Sends one authenticated request, any status of 400 and above is an error.
    ///
    /// The body of a rejected response is never read.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<Response> {
        let url = self.build_url(path)?;
        let request = self.http.request(method, url).query(query);
        debug!(?request, "sending request");
        let response = request.send().await?;
        debug!(?response, "received response");
        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(Error::HttpStatus(status));
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        let response = self.request(Method::GET, path, query).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(Error::Decode)
    }

    pub fn repos(&self) -> GhRepos<'_> {
        GhRepos { client: self }
    }
}

mod repos {
    use super::*;

    /// GitHub's repository resource.
    ///
    /// [GitHub Docs].
    ///
    /// [GitHub Docs]: https://docs.github.com/en/rest/repos/repos
    #[derive(Debug)]
    pub struct GhRepos<'c> {
        pub client: &'c GhClient,
    }

    impl GhRepos<'_> {
        /// List forked repositories for a user, one page at a time.
        ///
        /// [GitHub Docs].
        ///
        /// [GitHub Docs]: https://docs.github.com/en/rest/repos/repos#list-repositories-for-a-user
        pub async fn list_forks_for_user(
            &self,
            owner: &str,
            page: u32,
            per_page: u8,
        ) -> ClientResult<Vec<Repository>> {
            let path = format!("/users/{owner}/repos");
            let query = [
                ("type", "forks".to_owned()),
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
            ];
            let response_body: Vec<Repository> = self.client.get_json(&path, &query).await?;
            debug!(page, count = response_body.len(), "response body");
            Ok(response_body)
        }

        /// Delete a repository.
        ///
        /// [GitHub Docs].
        ///
        /// [GitHub Docs]: https://docs.github.com/en/rest/repos/repos#delete-a-repository
        pub async fn delete_repository(&self, owner: &str, repo: &str) -> ClientResult<()> {
            let path = format!("/repos/{owner}/{repo}");
            self.client.request(Method::DELETE, &path, &[]).await?;
            Ok(())
        }
    }
}

#[async_trait]
impl GitHubClient for GhClient {
    async fn list_forks_for_user(
        &self,
        owner: &str,
        page: u32,
        per_page: u8,
    ) -> Result<Vec<Repository>, Error> {
        self.repos().list_forks_for_user(owner, page, per_page).await
    }

    async fn delete_repository(&self, owner: &str, repo: &str) -> Result<(), Error> {
        self.repos().delete_repository(owner, repo).await
    }
}
