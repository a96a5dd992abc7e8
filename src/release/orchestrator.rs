//! The release step sequence.
//!
//! Steps run strictly in order. Each one announces its action first and, in a dry run,
//! returns right after the announcement. A failing step or an interrupt ends the sequence and
//! hands the context to [`rollback`].

use super::{ReleaseContext, ReleasePhase, rollback};
use crate::artifacts::{self, ArtifactBuilder};
use crate::changelog;
use crate::cli::OutputManager;
use crate::docs;
use crate::error::{CliError, GitError, PROMPT_DECLINED_EXIT_STATUS, ReleaseError, Result};
use crate::git::GitRepository;
use crate::github::GitHubReleaseManager;
use crate::metadata::{self, MetadataFile, RELEASE_DATE_ENTRY, VERSION_ENTRY};
use crate::version::Version;
use std::future::Future;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Files and directories the release edits besides the repositories themselves
#[derive(Debug, Clone)]
pub struct ReleaseLayout {
    /// Plug-in metadata file
    pub metadata: MetadataFile,
    /// Changelog file
    pub changelog_file: PathBuf,
    /// Staging subdirectory of the documentation tree
    pub docs_staging_dir: PathBuf,
    /// Documentation directories replaced from staging
    pub docs_mirrored_dirs: Vec<String>,
}

/// How a release attempt ended
#[derive(Debug)]
enum Termination {
    Completed,
    Failed(ReleaseError),
    Interrupted,
}

fn release_message(version: &str) -> String {
    format!("Release {version}")
}

/// Whether a prompt answer counts as yes
pub fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes" | "t" | "true" | "on" | "1"
    )
}

/// Drives one release attempt from checks to publication
pub struct ReleaseOrchestrator<'a, B> {
    ctx: ReleaseContext<'a>,
    layout: ReleaseLayout,
    builder: B,
    publisher: GitHubReleaseManager,
    output: &'a OutputManager,
    phase: ReleasePhase,
}

impl<'a, B: ArtifactBuilder> ReleaseOrchestrator<'a, B> {
    pub fn new(
        ctx: ReleaseContext<'a>,
        layout: ReleaseLayout,
        builder: B,
        publisher: GitHubReleaseManager,
        output: &'a OutputManager,
    ) -> Self {
        Self {
            ctx,
            layout,
            builder,
            publisher,
            output,
            phase: ReleasePhase::Init,
        }
    }

    pub fn context(&self) -> &ReleaseContext<'a> {
        &self.ctx
    }

    /// Last completed phase
    pub fn phase(&self) -> ReleasePhase {
        self.phase
    }

    /// Run the release, rolling back on Ctrl-C or failure. Returns the process exit status.
    pub async fn execute(&mut self) -> Result<i32> {
        self.execute_until(interrupt_signal()).await
    }

    /// Run the release, treating completion of `interrupt` like Ctrl-C
    pub async fn execute_until<F>(&mut self, interrupt: F) -> Result<i32>
    where
        F: Future<Output = ()>,
    {
        let termination = {
            let release = self.run_steps();
            tokio::pin!(release);
            tokio::pin!(interrupt);

            tokio::select! {
                biased;
                () = &mut interrupt => Termination::Interrupted,
                result = &mut release => match result {
                    Ok(()) => Termination::Completed,
                    Err(e) => Termination::Failed(e),
                },
            }
        };

        match termination {
            Termination::Completed => Ok(0),
            Termination::Failed(ReleaseError::Cli(CliError::UserDeclined)) => {
                self.output.error("Aborting.");
                Ok(PROMPT_DECLINED_EXIT_STATUS)
            }
            Termination::Failed(err) => {
                self.output.error("The following error has occurred:");
                self.output.error(&err.to_string());
                // Output failures must not keep the rollback from running.
                for suggestion in err.recovery_suggestions() {
                    let _ = self.output.indent(&suggestion);
                }

                if err.triggers_rollback() && self.phase.has_local_effects() {
                    self.output.error("Performing rollback and aborting.");
                    self.roll_back().await?;
                }
                Ok(err.exit_code())
            }
            Termination::Interrupted => {
                log::warn!("Interrupted after phase '{}'", self.phase);
                if !self.phase.has_local_effects() {
                    self.output.error("Aborting.");
                    return Ok(1);
                }
                self.output.error("Performing rollback and aborting.");
                self.roll_back().await?;
                Ok(1)
            }
        }
    }

    async fn roll_back(&mut self) -> Result<()> {
        if self.phase.has_remote_effects() {
            let _ = self.output.warn(
                "Pushed commits, tags and published releases are not undone by rollback",
            );
        }
        self.advance(ReleasePhase::RollingBack);
        rollback(&self.ctx).await
    }

    fn advance(&mut self, phase: ReleasePhase) {
        log::debug!("Release phase: {} -> {}", self.phase, phase);
        self.phase = phase;
    }

    fn dry_run(&self) -> bool {
        self.ctx.options().dry_run
    }

    async fn run_steps(&mut self) -> Result<()> {
        self.check_local_changes().await?;
        self.advance(ReleasePhase::ChecksPassed);

        let version = self.compute_version()?;
        self.ensure_unreleased(&version).await?;
        self.confirm().await?;
        self.advance(ReleasePhase::VersionComputed);

        self.update_changelog(&version).await?;
        self.advance(ReleasePhase::NotesExtracted);

        self.update_metadata(&version).await?;
        self.advance(ReleasePhase::ConfigUpdated);

        self.commit_main(&version).await?;
        self.advance(ReleasePhase::MainCommitted);

        self.create_tag(&version).await?;
        self.advance(ReleasePhase::Tagged);

        self.stage_docs().await?;
        self.advance(ReleasePhase::DocsStaged);

        self.commit_docs(&version).await?;
        self.advance(ReleasePhase::DocsCommitted);

        self.build_artifacts().await?;
        self.advance(ReleasePhase::ArtifactsBuilt);

        self.push_main().await?;
        self.advance(ReleasePhase::MainPushed);

        self.push_tag(&version).await?;
        self.advance(ReleasePhase::TagPushed);

        self.push_docs().await?;
        self.advance(ReleasePhase::DocsPushed);

        self.publish(&version).await?;
        self.advance(ReleasePhase::Published);

        self.output.success(&format!("Released {version}"))?;
        self.advance(ReleasePhase::Done);
        Ok(())
    }

    async fn check_local_changes(&self) -> Result<()> {
        let main = self.ctx.main_repo();
        self.output.step(
            &format!("Checking for local changes in {}", main.path().display()),
            self.dry_run(),
        )?;

        if main.has_local_changes().await? {
            if !self.ctx.options().force {
                return Err(GitError::DirtyWorkingTree {
                    branch: head_description(main).await,
                }
                .into());
            }
            self.output
                .warn("Main repository has local changes; continuing because of --force")?;
        }

        let docs = self.ctx.docs_repo();
        if docs.has_local_changes().await? {
            return Err(GitError::DirtyWorkingTree {
                branch: head_description(docs).await,
            }
            .into());
        }

        let branch = main.active_branch_name().await?;
        self.output.indent(&format!("Active branch: {branch}"))?;
        Ok(())
    }

    fn compute_version(&self) -> Result<String> {
        let options = self.ctx.options();
        let mut version = Version::parse(self.ctx.current_version())?;
        version.increment(options.release_type, options.prerelease.as_deref())?;
        let version = version.to_string();

        self.output
            .indent(&format!("Current version: {}", self.ctx.current_version()))?;
        self.output.indent(&format!("New version: {version}"))?;

        self.ctx.set_new_version(version.clone())?;
        Ok(version)
    }

    async fn ensure_unreleased(&self, version: &str) -> Result<()> {
        if self.ctx.main_repo().tag_exists(version).await? {
            return Err(GitError::TagAlreadyExists {
                tag: version.to_string(),
            }
            .into());
        }
        Ok(())
    }

    async fn confirm(&self) -> Result<()> {
        if !self.ctx.options().interactive {
            return Ok(());
        }

        self.output.prompt("Proceed with release? [y/n] ")?;
        let mut answer = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut answer)
            .await?;

        if is_affirmative(&answer) {
            Ok(())
        } else {
            Err(CliError::UserDeclined.into())
        }
    }

    async fn update_changelog(&mut self, version: &str) -> Result<()> {
        let path = &self.layout.changelog_file;
        self.output.step(
            &format!("Renaming the first changelog section to {version} in {}", path.display()),
            self.dry_run(),
        )?;

        let document = tokio::fs::read_to_string(path).await?;
        let edit = changelog::extract_and_retitle(&document, version, self.ctx.released_versions());

        let Some(updated) = edit.updated else {
            match edit.header {
                Some(header) => self.output.warn(&format!(
                    "Changelog section '{}' is already released; leaving the changelog as is",
                    header.title
                ))?,
                None => self.output.warn("Changelog has no section header")?,
            }
            return Ok(());
        };

        self.ctx.set_release_notes(edit.release_notes);
        if self.dry_run() {
            return Ok(());
        }

        tokio::fs::write(path, updated).await?;
        Ok(())
    }

    async fn update_metadata(&self, version: &str) -> Result<()> {
        let date = metadata::format_release_date(chrono::Utc::now());
        self.output.step(
            &format!(
                "Setting {VERSION_ENTRY} to {version} and {RELEASE_DATE_ENTRY} to {date} in {}",
                self.layout.metadata.path().display()
            ),
            self.dry_run(),
        )?;
        if self.dry_run() {
            return Ok(());
        }

        self.layout
            .metadata
            .update(&[(VERSION_ENTRY, version), (RELEASE_DATE_ENTRY, date.as_str())])
            .await
    }

    async fn commit_main(&self, version: &str) -> Result<()> {
        self.output.step("Creating release commit", self.dry_run())?;
        if self.dry_run() {
            return Ok(());
        }

        self.ctx
            .main_repo()
            .create_release_commit(&release_message(version))
            .await
    }

    async fn create_tag(&self, version: &str) -> Result<()> {
        self.output
            .step(&format!("Creating tag {version}"), self.dry_run())?;
        if self.dry_run() {
            return Ok(());
        }

        self.ctx
            .main_repo()
            .create_annotated_tag(version, &release_message(version))
            .await
    }

    async fn stage_docs(&self) -> Result<()> {
        let docs_root = self.ctx.docs_repo().path();
        self.output.step(
            &format!(
                "Replacing {} in {} with their staged copies from {}",
                self.layout.docs_mirrored_dirs.join(", "),
                docs_root.display(),
                self.layout.docs_staging_dir.display()
            ),
            self.dry_run(),
        )?;
        if self.dry_run() {
            return Ok(());
        }

        docs::mirror_staged_dirs(
            docs_root,
            &self.layout.docs_staging_dir,
            &self.layout.docs_mirrored_dirs,
        )
        .await
    }

    async fn commit_docs(&self, version: &str) -> Result<()> {
        self.output
            .step("Creating release commit in documentation repository", self.dry_run())?;
        if self.dry_run() {
            return Ok(());
        }

        self.ctx
            .docs_repo()
            .create_release_commit(&release_message(version))
            .await
    }

    async fn build_artifacts(&self) -> Result<()> {
        let options = self.ctx.options();
        let installers = options
            .installers
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        self.output.step(
            &format!(
                "Building installers ({installers}) into {}",
                self.ctx.artifacts_dir().display()
            ),
            self.dry_run(),
        )?;
        if self.dry_run() {
            return Ok(());
        }

        artifacts::remove_output_dir(self.ctx.artifacts_dir()).await?;
        self.builder
            .build(&options.installers, options.force)
            .await
    }

    async fn push_main(&self) -> Result<()> {
        let options = self.ctx.options();
        let main = self.ctx.main_repo();
        let refspec = format!("{}:{}", main.active_branch_name().await?, options.remote_branch);
        self.output.step(
            &format!("Pushing {refspec} to {}", options.remote_name),
            self.dry_run(),
        )?;
        if self.dry_run() {
            return Ok(());
        }

        main.push(&options.remote_name, &refspec).await
    }

    async fn push_tag(&self, version: &str) -> Result<()> {
        let remote = &self.ctx.options().remote_name;
        self.output
            .step(&format!("Pushing tag {version} to {remote}"), self.dry_run())?;
        if self.dry_run() {
            return Ok(());
        }

        self.ctx.main_repo().push(remote, version).await
    }

    async fn push_docs(&self) -> Result<()> {
        let remote = &self.ctx.options().remote_name;
        let docs = self.ctx.docs_repo();
        let branch = docs.active_branch_name().await?;
        let refspec = format!("{branch}:{branch}");
        self.output.step(
            &format!("Pushing documentation {refspec} to {remote}"),
            self.dry_run(),
        )?;
        if self.dry_run() {
            return Ok(());
        }

        docs.push(remote, &refspec).await
    }

    async fn publish(&self, version: &str) -> Result<()> {
        let artifacts_dir = self.ctx.artifacts_dir();
        self.output.step(
            &format!(
                "Creating release {version} and uploading artifacts from {}",
                artifacts_dir.display()
            ),
            self.dry_run(),
        )?;
        if self.dry_run() {
            return Ok(());
        }

        let upload_url = self
            .publisher
            .create_release(
                version,
                &self.ctx.options().remote_branch,
                version,
                self.ctx.release_notes(),
            )
            .await?;

        let artifacts = artifacts::collect_artifacts(artifacts_dir)?;
        let uploaded = self
            .publisher
            .upload_artifacts(&upload_url, &artifacts)
            .await?;
        for name in &uploaded {
            self.output.indent(&format!("Uploaded {name}"))?;
        }
        Ok(())
    }
}

/// Branch name for error reports; a detached HEAD has none
async fn head_description(repo: &GitRepository) -> String {
    repo.active_branch_name()
        .await
        .unwrap_or_else(|_| "detached HEAD".to_string())
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn interrupt_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}
