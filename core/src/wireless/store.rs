//! Plain text persistence of network names, one per line.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, warn};

/// Writes `names` sorted and without duplicates, replacing any existing file.
pub fn save_names<I, S>(path: impl AsRef<Path>, names: I) -> anyhow::Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let path = path.as_ref();
    let unique: BTreeSet<String> = names
        .into_iter()
        .map(|name| name.as_ref().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    let mut content = String::new();
    for name in &unique {
        content.push_str(name);
        content.push('\n');
    }

    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    debug!("saved {} network names to {}", unique.len(), path.display());
    Ok(())
}

/// Reads names back in file order. An unreadable file yields no names.
pub fn load_names(path: impl AsRef<Path>) -> Vec<String> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(content) => content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect(),
        Err(e) => {
            warn!("could not read {}: {e}", path.display());
            Vec::new()
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
