//! Implementation of `keel get`: clone third-party CMake projects and build
//! them.

use std::path::Path;

use anyhow::{Context, Result};
use git2::build::RepoBuilder;
use git2::{Cred, CredentialType, FetchOptions, RemoteCallbacks};
use url::Url;

use crate::builder::cmake::{BuildType, OrchestratorSettings};
use crate::builder::platform::PlatformStrategy;
use crate::ops::keel_build::{build, BuildOptions};
use crate::util::process::Executor;

/// Name used when none can be derived from a URL.
pub const UNKNOWN_LIBRARY: &str = "unknown_lib";

/// libgit2 asks again after a rejected credential; give up after this many.
const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

/// Fetches a repository into a directory.
pub trait Cloner {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Clones with libgit2, authenticating with the user's own credentials.
///
/// SSH remotes use the running ssh-agent; HTTPS remotes use the
/// credential helper from the user's git configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitCloner;

impl GitCloner {
    fn callbacks<'a>(config: Option<git2::Config>) -> RemoteCallbacks<'a> {
        let mut picker = CredentialPicker::new(config);
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |url, username, allowed| picker.pick(url, username, allowed));
        callbacks
    }
}

impl Cloner for GitCloner {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        tracing::info!("Cloning {}", url);

        let config = git2::Config::open_default().ok();
        let mut fetch = FetchOptions::new();
        fetch.remote_callbacks(Self::callbacks(config));

        RepoBuilder::new()
            .fetch_options(fetch)
            .clone(url, dest)
            .with_context(|| format!("failed to clone {}", url))?;
        Ok(())
    }
}

/// Answers the credential requests of one clone.
struct CredentialPicker {
    config: Option<git2::Config>,
    attempts: usize,
}

impl CredentialPicker {
    fn new(config: Option<git2::Config>) -> Self {
        CredentialPicker {
            config,
            attempts: 0,
        }
    }

    fn pick(
        &mut self,
        url: &str,
        username: Option<&str>,
        allowed: CredentialType,
    ) -> std::result::Result<Cred, git2::Error> {
        self.attempts += 1;
        if self.attempts > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str("authentication failed"));
        }
        credentials(url, username, allowed, self.config.as_ref())
    }
}

/// Pick a credential for one libgit2 authentication request.
fn credentials(
    url: &str,
    username: Option<&str>,
    allowed: CredentialType,
    config: Option<&git2::Config>,
) -> std::result::Result<Cred, git2::Error> {
    if allowed.contains(CredentialType::USERNAME) {
        return Cred::username(username.unwrap_or("git"));
    }
    if allowed.contains(CredentialType::SSH_KEY) {
        return Cred::ssh_key_from_agent(username.unwrap_or("git"));
    }
    if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
        if let Some(config) = config {
            return Cred::credential_helper(config, url, username);
        }
    }
    if allowed.contains(CredentialType::DEFAULT) {
        return Cred::default();
    }
    Err(git2::Error::from_str(&format!("no usable credentials for {}", url)))
}

/// Options for `keel get`.
#[derive(Debug, Clone, Default)]
pub struct GetOptions {
    pub build_type: BuildType,
    pub install_prefix: Option<String>,
}

/// Which libraries were fetched and built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
}

impl GetReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Derive a library name from a repository URL.
///
/// The last path segment without a `.git` suffix, or [`UNKNOWN_LIBRARY`].
pub fn library_name(url: &str) -> String {
    let segment = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(str::to_string),
        // scp-like `git@host:owner/repo.git` and plain paths
        Err(_) => url.rsplit_once('/').map(|(_, last)| last.to_string()),
    };

    match segment {
        Some(segment) if !segment.is_empty() => match segment.strip_suffix(".git") {
            Some(stem) if !stem.is_empty() => stem.to_string(),
            _ => segment,
        },
        _ => UNKNOWN_LIBRARY.to_string(),
    }
}

/// Clone every URL into `parent` and build it there.
///
/// A failing URL is recorded and the loop moves on to the next one.
pub fn get(
    parent: &Path,
    urls: &[String],
    opts: &GetOptions,
    cloner: &dyn Cloner,
    platform: &dyn PlatformStrategy,
    exec: &dyn Executor,
    settings: &OrchestratorSettings,
) -> GetReport {
    let mut report = GetReport::default();

    for url in urls {
        let name = library_name(url);
        match fetch_one(parent, url, &name, opts, cloner, platform, exec, settings) {
            Ok(()) => {
                tracing::info!("Fetched and built {}", name);
                report.succeeded.push(name);
            }
            Err(e) => {
                tracing::error!("Failed to get {}: {:#}", name, e);
                report.failed.push(name);
            }
        }
    }

    report
}

#[allow(clippy::too_many_arguments)]
fn fetch_one(
    parent: &Path,
    url: &str,
    name: &str,
    opts: &GetOptions,
    cloner: &dyn Cloner,
    platform: &dyn PlatformStrategy,
    exec: &dyn Executor,
    settings: &OrchestratorSettings,
) -> Result<()> {
    let dest = parent.join(name);
    cloner.clone_repo(url, &dest)?;

    let build_opts = BuildOptions {
        build_type: opts.build_type,
        install_prefix: opts.install_prefix.clone(),
        ..BuildOptions::default()
    };
    build(&dest, &build_opts, platform, exec, settings.clone())
        .with_context(|| format!("failed to build {}", name))?;
    Ok(())
}
