//! Tree construction from a rule repository on disk

use arcade_fs::constants::is_hidden;
use arcade_fs::{ArcadePath, DirEntry, EntryKind, NormalizedPath, io};

use super::{RuleTree, root_name};
use crate::model::{Dataset, Rule};
use crate::{Error, Result};

/// Build the desired tree from the repository at `repo`.
///
/// `base` is the container address the repository root corresponds to.
/// Directories with no regular files directly inside are nested datasets;
/// any other directory is a rule folder. Hidden entries are ignored.
pub fn from_file_tree(repo: &NormalizedPath, base: &NormalizedPath) -> Result<RuleTree> {
    let mut root = Dataset::new(root_name(base), base.clone());
    read_dataset(repo, &mut root)?;
    RuleTree::from_root(root)
}

fn read_dataset(dir: &NormalizedPath, dataset: &mut Dataset) -> Result<()> {
    for entry in visible_entries(dir)? {
        match entry.kind {
            EntryKind::Dir => {
                let files: Vec<DirEntry> = visible_entries(&entry.path)?
                    .into_iter()
                    .filter(|e| e.kind == EntryKind::File)
                    .collect();

                if files.is_empty() {
                    tracing::debug!(dir = %entry.path, "Dataset folder");
                    let mut child = Dataset::new(entry.name.clone(), dataset.path.join(&entry.name));
                    read_dataset(&entry.path, &mut child)?;
                    dataset.datasets.push(child);
                } else {
                    tracing::debug!(dir = %entry.path, "Rule folder");
                    dataset.rules.push(read_rule_folder(&entry.path, &files, &dataset.path)?);
                }
            }
            _ => tracing::debug!(entry = %entry.path, "Ignoring non-directory entry"),
        }
    }
    Ok(())
}

/// A rule folder holds exactly one `config.json` and one script file.
fn read_rule_folder(folder: &NormalizedPath, files: &[DirEntry], container: &NormalizedPath) -> Result<Rule> {
    let config_name = ArcadePath::RuleConfig.as_str();
    let (configs, scripts): (Vec<&DirEntry>, Vec<&DirEntry>) =
        files.iter().partition(|f| f.name == config_name);

    let malformed = |reason: String| Error::MalformedRuleFolder {
        path: folder.to_native(),
        reason,
    };

    let config = match configs.as_slice() {
        [config] => config,
        _ => return Err(malformed(format!("missing {}", config_name))),
    };
    let script = match scripts.as_slice() {
        [script] => script,
        [] => return Err(malformed("missing script file".to_string())),
        many => {
            return Err(malformed(format!(
                "expected one script file, found {}",
                many.len()
            )));
        }
    };

    Rule::read_file_record(&config.path, &script.path, container.clone())
}

fn visible_entries(dir: &NormalizedPath) -> Result<Vec<DirEntry>> {
    Ok(io::list_dir(dir)?
        .into_iter()
        .filter(|entry| {
            let hidden = is_hidden(&entry.name);
            if hidden {
                tracing::debug!(entry = %entry.path, "Skipping hidden entry");
            }
            !hidden
        })
        .collect())
}
