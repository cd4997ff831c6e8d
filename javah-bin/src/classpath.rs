//! Locates class files on a class path.

use std::{
    ffi::OsStr,
    fs::{self, File},
    io::{self, BufReader, Read},
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use javah::ClassResolver;
use tracing::{debug, trace};
use zip::{result::ZipError, ZipArchive};

/// One class path element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Directory(PathBuf),
    Archive(PathBuf),
}

impl Entry {
    fn new(path: PathBuf) -> Self {
        let is_archive = path
            .extension()
            .and_then(OsStr::to_str)
            .map_or(false, |ext| ext.eq_ignore_ascii_case("jar") || ext.eq_ignore_ascii_case("zip"));
        if is_archive {
            Self::Archive(path)
        } else {
            Self::Directory(path)
        }
    }

    /// Reads `relative` (a `/`-separated class file path) from this element.
    fn read(&self, archive: &ArchiveSlot, relative: &str) -> io::Result<Option<Vec<u8>>> {
        match self {
            Self::Directory(dir) => {
                let path = relative.split('/').fold(dir.clone(), |path, part| path.join(part));
                match fs::read(&path) {
                    Ok(bytes) => Ok(Some(bytes)),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
                    Err(e) => Err(e),
                }
            }
            Self::Archive(jar) => archive.read(jar, relative),
        }
    }
}

#[derive(Debug)]
enum ArchiveState {
    Unopened,
    Missing,
    Open(ZipArchive<BufReader<File>>),
}

/// An archive element, opened on first use and kept open.
#[derive(Debug)]
struct ArchiveSlot(Mutex<ArchiveState>);

impl ArchiveSlot {
    fn new() -> Self {
        Self(Mutex::new(ArchiveState::Unopened))
    }

    fn read(&self, jar: &Path, relative: &str) -> io::Result<Option<Vec<u8>>> {
        let mut state = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if let ArchiveState::Unopened = *state {
            *state = match File::open(jar) {
                Ok(file) => {
                    debug!(jar = %jar.display(), "opened archive");
                    ArchiveState::Open(ZipArchive::new(BufReader::new(file)).map_err(zip_error)?)
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => ArchiveState::Missing,
                Err(e) => return Err(e),
            };
        }
        let ArchiveState::Open(archive) = &mut *state else {
            return Ok(None);
        };
        let mut entry = match archive.by_name(relative) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(zip_error(e)),
        };
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes)?;
        Ok(Some(bytes))
    }
}

fn zip_error(error: ZipError) -> io::Error {
    match error {
        ZipError::Io(e) => e,
        e => io::Error::new(io::ErrorKind::InvalidData, e),
    }
}

/// Directories and archives searched for classes, in order.
#[derive(Debug)]
pub struct ClassPath {
    entries: Vec<Entry>,
    /// One slot per entry; only archive entries use theirs.
    archives: Vec<ArchiveSlot>,
}

impl ClassPath {
    /// Splits a platform path list such as `lib/a.jar:build/classes`.
    pub fn parse(paths: &OsStr) -> Self {
        let entries: Vec<Entry> = std::env::split_paths(paths)
            .filter(|p| !p.as_os_str().is_empty())
            .map(Entry::new)
            .collect();
        let archives = entries.iter().map(|_| ArchiveSlot::new()).collect();
        Self { entries, archives }
    }

    /// The explicit path if given, otherwise `$CLASSPATH`, otherwise `.`.
    pub fn from_option_or_env(explicit: Option<&OsStr>) -> Self {
        match explicit {
            Some(paths) => Self::parse(paths),
            None => match std::env::var_os("CLASSPATH") {
                Some(paths) if !paths.is_empty() => Self::parse(&paths),
                _ => Self::parse(OsStr::new(".")),
            },
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Finds the class file of a fully-qualified name.
    ///
    /// A dot may stand for the `$` of a nested class, so `a.Outer.Inner`
    /// also finds `a/Outer$Inner.class`.
    pub fn find(&self, class: &str) -> io::Result<Option<Vec<u8>>> {
        for candidate in candidates(class) {
            let relative = format!("{}.class", candidate);
            for (entry, archive) in self.entries.iter().zip(&self.archives) {
                trace!(?entry, relative = %relative, "probing");
                if let Some(bytes) = entry.read(archive, &relative)? {
                    debug!(class, ?entry, "found class");
                    return Ok(Some(bytes));
                }
            }
        }
        Ok(None)
    }
}

/// Internal names `class` may refer to, most likely first.
fn candidates(class: &str) -> Vec<String> {
    let mut name = class.replace('.', "/");
    let mut candidates = vec![name.clone()];
    while let Some(index) = name.rfind('/') {
        name.replace_range(index..=index, "$");
        candidates.push(name.clone());
    }
    candidates
}

fn is_class_file(class: &str) -> bool {
    Path::new(class).extension() == Some(OsStr::new("class"))
}

impl ClassResolver for ClassPath {
    fn resolve(&self, class: &str) -> io::Result<Vec<u8>> {
        if is_class_file(class) {
            return fs::read(class);
        }
        self.find(class)?.ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("class {} not found on the class path", class))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{ffi::OsString, fs, io::Write};

    use javah_class_file::testing::ClassFileBuilder;
    use zip::{write::SimpleFileOptions, ZipWriter};

    use super::{candidates, ClassPath, Entry};

    fn write_jar(path: &std::path::Path, classes: &[&str]) {
        let mut zip = ZipWriter::new(fs::File::create(path).unwrap());
        for class in classes {
            zip.start_file(format!("{}.class", class), SimpleFileOptions::default()).unwrap();
            zip.write_all(&ClassFileBuilder::new(class).build()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn nested_class_candidates() {
        assert_eq!(
            candidates("a.b.Outer.Inner"),
            ["a/b/Outer/Inner", "a/b/Outer$Inner", "a/b$Outer$Inner", "a$b$Outer$Inner"]
        );
        assert_eq!(candidates("Top"), ["Top"]);
    }

    #[test]
    fn parses_entries() {
        let paths = std::env::join_paths(["lib/a.jar", "classes", "lib/b.ZIP"]).unwrap();
        let cp = ClassPath::parse(&paths);
        assert_eq!(
            cp.entries(),
            [
                Entry::Archive("lib/a.jar".into()),
                Entry::Directory("classes".into()),
                Entry::Archive("lib/b.ZIP".into()),
            ]
        );
        assert!(ClassPath::parse(&OsString::new()).entries().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn archives_are_opened_once() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("lib.jar");
        write_jar(&jar, &["a/B", "a/C"]);
        let cp = ClassPath::parse(jar.as_os_str());

        assert!(cp.find("a.B").unwrap().is_some());
        // The open handle keeps serving lookups after the file is unlinked.
        fs::remove_file(&jar).unwrap();
        assert!(cp.find("a.C").unwrap().is_some());
        assert!(cp.find("a.D").unwrap().is_none());
    }

    #[test]
    fn missing_archives_find_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cp = ClassPath::parse(dir.path().join("absent.jar").as_os_str());
        assert!(cp.find("a.B").unwrap().is_none());
        assert!(cp.find("a.B").unwrap().is_none());
    }
}
