//! Latest-release lookup and change classification

use tracing::info;

use crate::error::Result;
use crate::github::{latest_release_path, ApiQuery, Release};
use crate::state::NO_RELEASES;

/// What the latest-release lookup found for one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// The repository has never published a release
    NoReleases,
    /// The latest release matches the baseline
    Unchanged { tag: String },
    /// The latest release differs from the baseline (or was never observed)
    Changed { previous: String, release: Release },
}

impl ReleaseOutcome {
    /// Tag to record in the baseline
    pub fn tag(&self) -> &str {
        match self {
            ReleaseOutcome::NoReleases => NO_RELEASES,
            ReleaseOutcome::Unchanged { tag } => tag,
            ReleaseOutcome::Changed { release, .. } => &release.tag_name,
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, ReleaseOutcome::Changed { .. })
    }
}

/// Resolves the latest release of a repository through an [`ApiQuery`]
pub struct ReleaseResolver<'a, C: ?Sized> {
    client: &'a C,
}

impl<'a, C: ApiQuery + ?Sized> ReleaseResolver<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Look up the latest release of `full_name` and compare it to `previous`
    ///
    /// `previous` is empty for repositories not yet in the baseline.
    pub async fn resolve(&self, full_name: &str, previous: &str) -> Result<ReleaseOutcome> {
        let response = self.client.query(&latest_release_path(full_name)).await?;

        if response.is_not_found() {
            info!(repo = full_name, "Project {} doesn't have releases", full_name);
            return Ok(ReleaseOutcome::NoReleases);
        }

        let release: Release = response.json(format!("latest release of {}", full_name))?;

        if release.tag_name == previous {
            info!(
                repo = full_name,
                tag = %release.tag_name,
                "Latest release for {} is {} - no changes",
                full_name,
                release.tag_name
            );
            return Ok(ReleaseOutcome::Unchanged {
                tag: release.tag_name,
            });
        }

        info!(
            repo = full_name,
            tag = %release.tag_name,
            previous,
            url = %release.html_url,
            "Latest release for {} is {} - previous {}",
            full_name,
            release.tag_name,
            previous
        );
        Ok(ReleaseOutcome::Changed {
            previous: previous.to_string(),
            release,
        })
    }
}
