//! Release command execution.
//!
//! Resolves the project layout, snapshots both repositories and hands over to the
//! orchestrator.

use crate::artifacts::CommandArtifactBuilder;
use crate::cli::{Args, OutputManager};
use crate::error::Result;
use crate::git::GitRepository;
use crate::github::{GitHubReleaseConfig, GitHubReleaseManager};
use crate::metadata::{MetadataFile, VERSION_ENTRY};
use crate::release::{ReleaseContext, ReleaseLayout, ReleaseOptions, ReleaseOrchestrator};
use crate::settings::{SETTINGS_FILE_NAME, Settings};

/// Execute the release command, returning the process exit status
pub(super) async fn execute_release(args: &Args, output: &OutputManager) -> Result<i32> {
    let main_repo = GitRepository::open(&args.repo).await?;
    let root = main_repo.path().to_path_buf();

    let settings = match &args.config {
        Some(path) => Settings::load(path).await?,
        None => Settings::load_or_default(&root.join(SETTINGS_FILE_NAME)).await?,
    };

    let metadata = MetadataFile::load(settings.metadata_path(&root)).await?;
    let current_version = metadata.require(VERSION_ENTRY)?.to_string();
    let (owner, repo) = settings.hosting_repository(&metadata)?;
    log::debug!("Publishing to {owner}/{repo} via {}", settings.api_base);

    let docs_repo = GitRepository::open(settings.docs_repo_path(&root)).await?;
    let builder = CommandArtifactBuilder::new(&settings.builder, &root)?;
    let publisher = GitHubReleaseManager::new(GitHubReleaseConfig {
        api_base: settings.api_base.clone(),
        owner,
        repo,
        token: args.github_access_token.clone(),
    })?;

    let options = ReleaseOptions {
        release_type: args.release_type,
        prerelease: args.prerelease.clone(),
        force: args.force,
        dry_run: args.dry_run,
        interactive: !args.yes,
        installers: args.installers.clone(),
        remote_name: args.remote_name.clone(),
        remote_branch: args.remote_branch.clone(),
    };

    let ctx = ReleaseContext::capture(
        &main_repo,
        &docs_repo,
        current_version,
        options,
        settings.artifacts_path(&root),
    )
    .await?;

    let layout = ReleaseLayout {
        metadata,
        changelog_file: settings.changelog_path(&root),
        docs_staging_dir: settings.docs_staging_dir.clone(),
        docs_mirrored_dirs: settings.docs_mirrored_dirs.clone(),
    };

    ReleaseOrchestrator::new(ctx, layout, builder, publisher, output)
        .execute()
        .await
}
