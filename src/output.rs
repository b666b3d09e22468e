//! Blocklist variants and atomic output writing.

use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{error, info};

use crate::config::OutputConfig;
use crate::error::BlocklistError;
use crate::optimizer::optimize;

/// The four lists produced by a run, each sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlocklistVariants {
    pub plain: Vec<String>,
    pub plain_without_shortlinks: Vec<String>,
    pub optimized: Vec<String>,
    pub optimized_without_shortlinks: Vec<String>,
}

impl BlocklistVariants {
    /// Derive all variants from the verified domain set.
    ///
    /// Shortlink domains are removed before optimization and appended
    /// unconditionally to the variants that include them.
    pub fn build(domains: &HashSet<String>, shortlinks: &[String]) -> Self {
        let without_shortlinks: HashSet<String> = domains
            .iter()
            .filter(|d| !shortlinks.contains(d))
            .cloned()
            .collect();
        let optimized = optimize(&without_shortlinks);

        Self {
            plain: sorted_with(&without_shortlinks, shortlinks),
            plain_without_shortlinks: sorted_with(&without_shortlinks, &[]),
            optimized: sorted_with(&optimized, shortlinks),
            optimized_without_shortlinks: sorted_with(&optimized, &[]),
        }
    }

    /// Write the four lists into `dir`. Returns the number of failed writes.
    pub fn write_all(&self, dir: &Path, names: &OutputConfig) -> usize {
        let files = [
            (&names.plain, &self.plain),
            (&names.plain_without_shortlinks, &self.plain_without_shortlinks),
            (&names.optimized, &self.optimized),
            (&names.optimized_without_shortlinks, &self.optimized_without_shortlinks),
        ];

        let mut failures = 0;
        for (name, domains) in files {
            let path = dir.join(name);
            match write_blocklist(&path, domains) {
                Ok(()) => info!("Wrote {} domains to {}", domains.len(), path.display()),
                Err(e) => {
                    error!("{}", e);
                    failures += 1;
                }
            }
        }
        failures
    }
}

fn sorted_with(domains: &HashSet<String>, extra: &[String]) -> Vec<String> {
    let mut list: Vec<String> = domains.iter().chain(extra.iter()).cloned().collect();
    list.sort();
    list.dedup();
    list
}

/// Write `domains` newline-joined to `path`, replacing any existing file.
pub fn write_blocklist(path: &Path, domains: &[String]) -> Result<(), BlocklistError> {
    let to_error = |source| BlocklistError::Output {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut temp_file = NamedTempFile::new_in(parent).map_err(to_error)?;
    temp_file
        .write_all(domains.join("\n").as_bytes())
        .map_err(to_error)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp_file
            .as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .map_err(to_error)?;
    }
    temp_file.as_file().sync_all().map_err(to_error)?;
    temp_file.persist(path).map_err(|e| to_error(e.error))?;
    Ok(())
}
