use std::fmt;

/// Last completed step of a release attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReleasePhase {
    /// Nothing checked yet
    Init,
    /// Both working trees are clean (or forced)
    ChecksPassed,
    /// New version computed and confirmed unreleased
    VersionComputed,
    /// Changelog section retitled and notes extracted
    NotesExtracted,
    /// Metadata file carries the new version and date
    ConfigUpdated,
    /// Release commit created in the main repository
    MainCommitted,
    /// Annotated release tag created
    Tagged,
    /// Documentation directories replaced by their staged copies
    DocsStaged,
    /// Release commit created in the documentation repository
    DocsCommitted,
    /// Installers built
    ArtifactsBuilt,
    /// Main branch pushed
    MainPushed,
    /// Release tag pushed
    TagPushed,
    /// Documentation branch pushed
    DocsPushed,
    /// Release object created and artifacts uploaded
    Published,
    /// Release finished
    Done,
    /// Undoing local changes after a failure or interrupt
    RollingBack,
}

impl fmt::Display for ReleasePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReleasePhase::Init => "init",
            ReleasePhase::ChecksPassed => "checks passed",
            ReleasePhase::VersionComputed => "version computed",
            ReleasePhase::NotesExtracted => "notes extracted",
            ReleasePhase::ConfigUpdated => "config updated",
            ReleasePhase::MainCommitted => "main committed",
            ReleasePhase::Tagged => "tagged",
            ReleasePhase::DocsStaged => "docs staged",
            ReleasePhase::DocsCommitted => "docs committed",
            ReleasePhase::ArtifactsBuilt => "artifacts built",
            ReleasePhase::MainPushed => "main pushed",
            ReleasePhase::TagPushed => "tag pushed",
            ReleasePhase::DocsPushed => "docs pushed",
            ReleasePhase::Published => "published",
            ReleasePhase::Done => "done",
            ReleasePhase::RollingBack => "rolling back",
        };
        f.write_str(name)
    }
}

impl ReleasePhase {
    /// Whether a step that edits files, commits or tags may have run from this phase on
    pub fn has_local_effects(self) -> bool {
        self >= ReleasePhase::VersionComputed
    }

    /// Whether anything has been pushed or published from this phase on
    pub fn has_remote_effects(self) -> bool {
        self >= ReleasePhase::MainPushed && self != ReleasePhase::RollingBack
    }
}
