use crate::{
    display,
    filter::{self, Guards},
    github::{responses::Repository, Error as GitHubError},
    types::{Activity, Fork},
};
use anyhow::{Context, Error};
use async_trait::async_trait;
use console::style;
use futures::future;
use std::{io::Write, panic, sync::Arc};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub const DEFAULT_PER_PAGE: u8 = 100;
pub const DEFAULT_MAX_PAGES: u32 = 100;
pub const DEFAULT_OLDER_THAN_DAYS: u32 = 60;

#[async_trait]
pub trait GitHubClient: Send + Sync {
    /// List forked repositories for a user, one page at a time.
    ///
    /// [GitHub Docs].
    ///
    /// [GitHub Docs]: https://docs.github.com/en/rest/repos/repos#list-repositories-for-a-user
    async fn list_forks_for_user(
        &self,
        owner: &str,
        page: u32,
        per_page: u8,
    ) -> Result<Vec<Repository>, GitHubError>;

    /// Delete a repository.
    ///
    /// [GitHub Docs].
    ///
    /// [GitHub Docs]: https://docs.github.com/en/rest/repos/repos#delete-a-repository
    async fn delete_repository(&self, owner: &str, repo: &str) -> Result<(), GitHubError>;
}

/// Parameters of one sweep.
#[derive(PartialEq, Clone, Debug)]
pub struct SweepConfig {
    pub owner: String,
    pub per_page: u8,
    pub max_pages: u32,
    pub older_than_days: u32,
    pub guards: Vec<String>,
    pub activity: Activity,
    /// Nothing is deleted unless this is set.
    pub delete: bool,
}

impl SweepConfig {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            per_page: DEFAULT_PER_PAGE,
            max_pages: DEFAULT_MAX_PAGES,
            older_than_days: DEFAULT_OLDER_THAN_DAYS,
            guards: Vec::new(),
            activity: Activity::default(),
            delete: false,
        }
    }
}

/// How a sweep ended when nothing failed.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum Outcome {
    NoForks,
    DryRun { candidates: usize },
    NothingToDelete,
    Deleted { count: usize },
}

#[derive(Debug)]
pub struct App<C: ?Sized> {
    config: SweepConfig,
    client: Arc<C>,
}

impl<C> App<C>
where
    C: GitHubClient + ?Sized + 'static,
{
    pub fn new(client: Arc<C>, config: SweepConfig) -> Self {
        Self { config, client }
    }

    /// Fetches, filters, reports, and deletes when asked to.
    ///
    /// The listing is written to `out` before any deletion starts.
    pub async fn run(&self, out: &mut impl Write) -> Result<Outcome, Error> {
        let SweepConfig { owner, per_page, max_pages, older_than_days, guards, activity, delete } =
            &self.config;

        writeln!(out, "{}", style(format!("Fetching forked repositories for {owner}...")).blue())?;
        let forks = fetch_all_forks(&*self.client, owner, *per_page, *max_pages)
            .await
            .with_context(|| format!("failed to fetch forked repositories of `{owner}`"))?;

        if forks.is_empty() {
            writeln!(out, "{}", style("No forked repositories found.").green())?;
            return Ok(Outcome::NoForks);
        }
        info!(count = forks.len(), "fetched forks");

        let guards = Guards::new(guards);
        let partition = filter::partition(forks, &guards, *older_than_days, *activity);
        info!(
            guarded = partition.guarded.len(),
            unguarded = partition.unguarded.len(),
            "partitioned forks"
        );

        writeln!(out)?;
        display::write_partition(out, &partition, *activity)?;

        let candidates = partition.unguarded.len();
        if !delete {
            if candidates > 0 {
                writeln!(
                    out,
                    "\nRun again with --delete to remove {candidates} unguarded fork(s)."
                )?;
            }
            return Ok(Outcome::DryRun { candidates });
        }

        if candidates == 0 {
            writeln!(out, "\n{}", style("Nothing to delete.").green())?;
            return Ok(Outcome::NothingToDelete);
        }

        writeln!(out, "\n{}", style(format!("Deleting {candidates} forked repositories...")).blue())?;
        out.flush()?;
        delete_all(self.client.clone(), &partition.unguarded)
            .await
            .context("failed to delete forked repositories")?;
        writeln!(out, "{}", style("Deletion completed successfully.").green())?;

        Ok(Outcome::Deleted { count: candidates })
    }
}

/// Lists forks page by page until an empty page or `max_pages`.
///
/// Only an empty page ends the listing, a page holding nothing but non-forks does not. The first
/// failing page fails the whole fetch.
#[tracing::instrument(skip(client))]
pub async fn fetch_all_forks<C>(
    client: &C,
    owner: &str,
    per_page: u8,
    max_pages: u32,
) -> Result<Vec<Fork>, GitHubError>
where
    C: GitHubClient + ?Sized,
{
    let mut forks = Vec::new();
    for page in 1..=max_pages {
        let repos = client.list_forks_for_user(owner, page, per_page).await?;
        if repos.is_empty() {
            debug!(page, "empty page");
            break;
        }
        let count = repos.len();
        forks.extend(repos.into_iter().filter_map(Fork::from_repository));
        debug!(page, count, total = forks.len(), "fetched page");
    }
    Ok(forks)
}

/// Deletes every fork concurrently, one task each, and waits for all of them.
///
/// A failure does not stop the other deletions. The first failure observed is returned, the
/// rest are logged and dropped.
#[tracing::instrument(skip_all, fields(count = forks.len()))]
pub async fn delete_all<C>(client: Arc<C>, forks: &[Fork]) -> Result<(), GitHubError>
where
    C: GitHubClient + ?Sized + 'static,
{
    let (tx, mut rx) = mpsc::channel(1);

    let tasks: Vec<_> = forks
        .iter()
        .map(|fork| {
            let client = client.clone();
            let tx = tx.clone();
            let Fork { owner, name, .. } = fork.clone();
            tokio::spawn(async move {
                match client.delete_repository(&owner, &name).await {
                    Ok(()) => info!(%owner, %name, "deleted"),
                    Err(err) => {
                        warn!(%owner, %name, %err, "failed to delete");
                        // slot holds one failure, later ones are dropped
                        let _ = tx.try_send(err);
                    }
                }
            })
        })
        .collect();
    drop(tx);

    for joined in future::join_all(tasks).await {
        if let Err(err) = joined {
            if err.is_panic() {
                panic::resume_unwind(err.into_panic());
            }
        }
    }

    match rx.try_recv() {
        Ok(err) => Err(err),
        Err(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::responses::User;
    use chrono::{Duration, Utc};
    use http::StatusCode;
    use std::{
        collections::HashSet,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Mutex,
        },
    };

    fn repo(name: &str, fork: bool, age_days: i64) -> Repository {
        let at = Some(Utc::now() - Duration::days(age_days));
        Repository {
            name: name.to_owned(),
            html_url: format!("https://github.com/acme/{name}"),
            fork,
            owner: User { login: "acme".to_owned() },
            created_at: at,
            updated_at: at,
            pushed_at: at,
        }
    }

    #[derive(Default)]
    struct FakeClient {
        pages: Vec<Vec<Repository>>,
        list_error: Option<StatusCode>,
        forbidden: HashSet<String>,
        listed: AtomicUsize,
        deleted: Mutex<Vec<String>>,
    }

    impl FakeClient {
        fn with_pages(pages: Vec<Vec<Repository>>) -> Self {
            Self { pages, ..Default::default() }
        }

        fn deleted(&self) -> Vec<String> {
            let mut deleted = self.deleted.lock().unwrap().clone();
            deleted.sort();
            deleted
        }
    }

    #[async_trait]
    impl GitHubClient for FakeClient {
        async fn list_forks_for_user(
            &self,
            owner: &str,
            page: u32,
            _per_page: u8,
        ) -> Result<Vec<Repository>, GitHubError> {
            assert_eq!(owner, "acme");
            self.listed.fetch_add(1, Ordering::SeqCst);
            if let Some(status) = self.list_error {
                return Err(GitHubError::HttpStatus(status));
            }
            let page = self.pages.get(page as usize - 1).cloned().unwrap_or_default();
            Ok(page)
        }

        async fn delete_repository(&self, owner: &str, repo: &str) -> Result<(), GitHubError> {
            self.deleted.lock().unwrap().push(format!("{owner}/{repo}"));
            if self.forbidden.contains(repo) {
                return Err(GitHubError::HttpStatus(StatusCode::FORBIDDEN));
            }
            Ok(())
        }
    }

    fn names(forks: &[Fork]) -> Vec<String> {
        forks.iter().map(|x| x.name.clone()).collect()
    }

    #[tokio::test]
    async fn test_fetch_stops_at_empty_page() {
        let client = FakeClient::with_pages(vec![
            vec![repo("a", true, 90), repo("b", true, 90)],
            vec![],
            vec![repo("unreachable", true, 90)],
        ]);
        let forks = fetch_all_forks(&client, "acme", 10, 10).await.unwrap();
        assert_eq!(names(&forks), ["a", "b"]);
        assert_eq!(client.listed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetch_respects_max_pages() {
        let client = FakeClient::with_pages(vec![vec![repo("a", true, 90)], vec![repo("b", true, 90)]]);
        let forks = fetch_all_forks(&client, "acme", 10, 1).await.unwrap();
        assert_eq!(names(&forks), ["a"]);
        assert_eq!(client.listed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_continues_past_page_without_forks() {
        let client = FakeClient::with_pages(vec![
            vec![repo("a", true, 90), repo("source", false, 90)],
            vec![repo("not-a-fork", false, 90)],
            vec![repo("c", true, 90)],
        ]);
        let forks = fetch_all_forks(&client, "acme", 10, 10).await.unwrap();
        assert_eq!(names(&forks), ["a", "c"]);
        assert_eq!(client.listed.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_fetch_failure_discards_partial_results() {
        let client = FakeClient {
            list_error: Some(StatusCode::NOT_FOUND),
            ..FakeClient::with_pages(vec![vec![repo("a", true, 90)]])
        };
        let err = fetch_all_forks(&client, "acme", 10, 10).await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_delete_all_finishes_siblings_of_a_failure() {
        let client = Arc::new(FakeClient {
            forbidden: ["b".to_owned()].into_iter().collect(),
            ..Default::default()
        });
        let forks: Vec<_> = ["a", "b", "c"]
            .into_iter()
            .filter_map(|x| Fork::from_repository(repo(x, true, 90)))
            .collect();

        let err = delete_all(client.clone(), &forks).await.unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert_eq!(client.deleted(), ["acme/a", "acme/b", "acme/c"]);
    }

    #[tokio::test]
    async fn test_delete_all_reports_one_of_many_failures() {
        let client = Arc::new(FakeClient {
            forbidden: ["a", "b", "c"].into_iter().map(str::to_owned).collect(),
            ..Default::default()
        });
        let forks: Vec<_> = ["a", "b", "c"]
            .into_iter()
            .filter_map(|x| Fork::from_repository(repo(x, true, 90)))
            .collect();

        let err = delete_all(client.clone(), &forks).await.unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert_eq!(client.deleted().len(), 3);
    }

    #[tokio::test]
    async fn test_delete_all_with_nothing_to_delete() {
        let client = Arc::new(FakeClient::default());
        delete_all(client.clone(), &[]).await.unwrap();
        assert!(client.deleted().is_empty());
    }

    fn acme_client() -> FakeClient {
        FakeClient::with_pages(vec![vec![
            repo("infra-tools", true, 0),
            repo("old-lib", true, 90),
            repo("upstream-project", false, 90),
        ]])
    }

    #[tokio::test]
    async fn test_run_dry_run_deletes_nothing() {
        console::set_colors_enabled(false);
        let client = Arc::new(acme_client());
        let config = SweepConfig { guards: vec!["infra".to_owned()], ..SweepConfig::new("acme") };
        let app = App::new(client.clone(), config);

        let mut out = Vec::new();
        let outcome = app.run(&mut out).await.unwrap();

        assert_eq!(outcome, Outcome::DryRun { candidates: 1 });
        assert!(client.deleted().is_empty());
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Guarded forks (1):"), "{out}");
        assert!(out.contains("https://github.com/acme/infra-tools"), "{out}");
        assert!(out.contains("Unguarded forks (1):"), "{out}");
        assert!(out.contains("https://github.com/acme/old-lib"), "{out}");
        assert!(!out.contains("upstream-project"), "{out}");
        assert!(out.contains("--delete"), "{out}");
    }

    #[tokio::test]
    async fn test_run_deletes_unguarded_only() {
        console::set_colors_enabled(false);
        let client = Arc::new(acme_client());
        let config = SweepConfig {
            guards: vec!["infra".to_owned()],
            older_than_days: 0,
            delete: true,
            ..SweepConfig::new("acme")
        };
        let app = App::new(client.clone(), config);

        let mut out = Vec::new();
        let outcome = app.run(&mut out).await.unwrap();

        assert_eq!(outcome, Outcome::Deleted { count: 1 });
        assert_eq!(client.deleted(), ["acme/old-lib"]);
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Deletion completed successfully."), "{out}");
    }

    #[tokio::test]
    async fn test_run_with_nothing_to_delete() {
        let client = Arc::new(FakeClient::with_pages(vec![vec![repo("fresh", true, 1)]]));
        let config = SweepConfig { delete: true, ..SweepConfig::new("acme") };
        let app = App::new(client.clone(), config);

        let outcome = app.run(&mut Vec::new()).await.unwrap();

        assert_eq!(outcome, Outcome::NothingToDelete);
        assert!(client.deleted().is_empty());
    }

    #[tokio::test]
    async fn test_run_with_unbounded_age_keeps_everything() {
        let client = Arc::new(FakeClient::with_pages(vec![vec![repo("old-lib", true, 3650)]]));
        let config =
            SweepConfig { older_than_days: u32::MAX, delete: true, ..SweepConfig::new("acme") };
        let app = App::new(client.clone(), config);

        let outcome = app.run(&mut Vec::new()).await.unwrap();

        assert_eq!(outcome, Outcome::NothingToDelete);
        assert!(client.deleted().is_empty());
    }

    #[tokio::test]
    async fn test_run_without_forks() {
        let client = Arc::new(FakeClient::with_pages(vec![vec![repo("source", false, 90)]]));
        let app = App::new(client, SweepConfig { delete: true, ..SweepConfig::new("acme") });

        let outcome = app.run(&mut Vec::new()).await.unwrap();

        assert_eq!(outcome, Outcome::NoForks);
    }

    #[tokio::test]
    async fn test_run_fetch_failure_deletes_nothing() {
        let client = Arc::new(FakeClient {
            list_error: Some(StatusCode::NOT_FOUND),
            ..Default::default()
        });
        let app = App::new(client.clone(), SweepConfig { delete: true, ..SweepConfig::new("acme") });

        let err = app.run(&mut Vec::new()).await.unwrap_err();

        assert!(format!("{err:#}").contains("not found"), "{err:#}");
        let source = err.downcast_ref::<GitHubError>().unwrap();
        assert_eq!(source.status(), Some(StatusCode::NOT_FOUND));
        assert!(client.deleted().is_empty());
    }
}
