//! TMDB API client used to collect raw movie records

use anyhow::{Context, Result};
use async_trait::async_trait;
use boxoffice_lib::collection::RecordSource;
use boxoffice_lib::normalizer::{leading_cast, primary_crew_member, DIRECTOR_JOB, STAR_COUNT};
use boxoffice_lib::RawMovieRecord;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3/";

const LANGUAGE: &str = "en-US";

#[derive(Error, Debug)]
pub enum TmdbError {
    #[error("TMDB rejected the API key (401); check TMDB_API_KEY")]
    Unauthorized,

    #[error("TMDB rate limit hit (429); retry with a larger --delay-ms")]
    RateLimited,

    #[error("TMDB error ({status}): {body}")]
    Status { status: StatusCode, body: String },
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: u64,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Credits {
    #[serde(default)]
    crew: Value,
    #[serde(default)]
    cast: Value,
}

pub struct TmdbClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl TmdbClient {
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    pub fn with_base_url(base_url: &str, api_key: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            anyhow::bail!("TMDB API key is empty");
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let mut base_url = Url::parse(base_url).context("Invalid TMDB base URL")?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_string(),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;
        debug!(url = %url, "TMDB request");

        let response = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(&self.api_key)
            .header("accept", "application/json")
            .send()
            .await
            .context("Failed to send request")?;

        match response.status() {
            s if s.is_success() => {}
            StatusCode::UNAUTHORIZED => return Err(TmdbError::Unauthorized.into()),
            StatusCode::TOO_MANY_REQUESTS => return Err(TmdbError::RateLimited.into()),
            status => {
                let body = response.text().await.unwrap_or_default();
                return Err(TmdbError::Status { status, body }.into());
            }
        }

        response.json().await.context("Failed to parse response")
    }

    /// First search hit for a title, if any
    pub async fn search(&self, title: &str) -> Result<Option<u64>> {
        let page: SearchPage = self
            .get(
                "search/movie",
                &[
                    ("query", title),
                    ("include_adult", "false"),
                    ("language", LANGUAGE),
                    ("page", "1"),
                ],
            )
            .await
            .with_context(|| format!("Search for {:?} failed", title))?;
        Ok(page.results.first().map(|hit| hit.id))
    }

    /// Movie details with director and leading cast folded in
    pub async fn movie_record(&self, movie_id: u64) -> Result<RawMovieRecord> {
        let details: Value = self
            .get(&format!("movie/{}", movie_id), &[("language", LANGUAGE)])
            .await
            .with_context(|| format!("Details for movie {} failed", movie_id))?;
        let credits: Credits = self
            .get(&format!("movie/{}/credits", movie_id), &[("language", LANGUAGE)])
            .await
            .with_context(|| format!("Credits for movie {} failed", movie_id))?;

        let mut record = RawMovieRecord::from_value(details)?;
        record.insert("director", primary_crew_member(&credits.crew, DIRECTOR_JOB));
        for (i, star) in leading_cast(&credits.cast, STAR_COUNT).into_iter().enumerate() {
            record.insert(format!("star{}", i + 1), star);
        }
        Ok(record)
    }

    /// Titles from the discover listing, `pages` pages deep
    pub async fn discover_titles(&self, sort_by: &str, pages: u32) -> Result<Vec<String>> {
        let mut titles = Vec::new();
        for page in 1..=pages {
            let page_param = page.to_string();
            let listing: SearchPage = self
                .get(
                    "discover/movie",
                    &[
                        ("sort_by", sort_by),
                        ("page", page_param.as_str()),
                        ("include_adult", "false"),
                        ("language", LANGUAGE),
                    ],
                )
                .await
                .with_context(|| format!("Discover page {} failed", page))?;
            if listing.results.is_empty() {
                break;
            }
            titles.extend(listing.results.into_iter().filter_map(|hit| hit.title));
        }
        Ok(titles)
    }
}

#[async_trait]
impl RecordSource for TmdbClient {
    async fn fetch(&self, title: &str) -> Result<Option<RawMovieRecord>> {
        match self.search(title).await? {
            Some(id) => self.movie_record(id).await.map(Some),
            None => Ok(None),
        }
    }
}
