//! Writes rendered headers to disk.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use javah::{render_combined, HeaderUnit};
use tracing::{debug, info};

/// Where headers go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// One `<mangled class>.h` per class inside the directory.
    Directory(PathBuf),
    /// All classes concatenated into one file.
    Combined(PathBuf),
}

/// Writes `units` to `target`, returning the paths that were written.
///
/// Files whose content would not change are left untouched, so build tools
/// comparing timestamps do not rebuild needlessly.
pub fn write_units(units: &[HeaderUnit], target: &Target) -> Result<Vec<PathBuf>> {
    match target {
        Target::Directory(dir) => {
            fs::create_dir_all(dir).with_context(|| format!("failed to create directory {}", dir.display()))?;
            let mut written = Vec::new();
            for unit in units {
                let path = dir.join(&unit.file_name);
                if write_if_changed(&path, &unit.render())? {
                    written.push(path);
                }
            }
            Ok(written)
        }
        Target::Combined(file) => {
            if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create directory {}", parent.display()))?;
            }
            let written = write_if_changed(file, &render_combined(units))?;
            Ok(if written { vec![file.clone()] } else { Vec::new() })
        }
    }
}

fn write_if_changed(path: &Path, contents: &str) -> Result<bool> {
    if fs::read(path).map_or(false, |existing| existing == contents.as_bytes()) {
        debug!(path = %path.display(), "header up to date");
        return Ok(false);
    }
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "wrote header");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use javah::{analyze_class, ClassInfo, GeneratorConfig, MethodInfo};

    use super::{write_units, Target};

    fn unit(name: &str) -> javah::HeaderUnit {
        let class = ClassInfo::new(name).with_method(MethodInfo::new("f", "()V").native());
        analyze_class(&class, &GeneratorConfig::default()).unwrap().unwrap()
    }

    #[test]
    fn writes_one_file_per_class_and_skips_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let target = Target::Directory(dir.path().join("include"));
        let units = [unit("a/B"), unit("a/C")];

        let written = write_units(&units, &target).unwrap();
        assert_eq!(written.len(), 2);
        let text = std::fs::read_to_string(dir.path().join("include/a_B.h")).unwrap();
        assert_eq!(text, units[0].render());

        assert!(write_units(&units, &target).unwrap().is_empty());
    }

    #[test]
    fn combined_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("all.h");
        write_units(&[unit("a/B"), unit("a/C")], &Target::Combined(path.clone())).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text.matches("DO NOT EDIT").count(), 1);
        assert!(text.contains("Java_a_B_f") && text.contains("Java_a_C_f"));
    }
}
