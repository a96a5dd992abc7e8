//! Compensating actions for a failed or interrupted release.

use super::ReleaseContext;
use crate::artifacts::remove_output_dir;
use crate::error::Result;

/// Undo the local effects of a release attempt.
///
/// Deletes the release tag if this attempt created it, removes the artifact output directory
/// and hard-resets both repositories to their checkpoints. Pushed refs and published releases
/// are left alone. Only tag deletion failures are ignored. A dry run has nothing to undo.
pub async fn rollback(ctx: &ReleaseContext<'_>) -> Result<()> {
    if ctx.options().dry_run {
        log::info!("Dry run: skipping rollback");
        return Ok(());
    }

    if let Some(tag) = ctx.new_version()
        && !ctx.released_versions().contains(tag)
    {
        match ctx.main_repo().delete_tag(tag).await {
            Ok(()) => log::info!("Rollback: deleted tag {tag}"),
            Err(e) => log::debug!("Rollback: tag {tag} not deleted: {e}"),
        }
    }

    remove_output_dir(ctx.artifacts_dir()).await?;

    ctx.main_repo().reset_hard(ctx.checkpoint_main()).await?;
    log::info!("Rollback: main repository reset to {}", ctx.checkpoint_main());

    ctx.docs_repo().reset_hard(ctx.checkpoint_docs()).await?;
    log::info!("Rollback: docs repository reset to {}", ctx.checkpoint_docs());

    Ok(())
}
