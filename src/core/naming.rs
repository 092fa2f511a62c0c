use regex::Regex;
use std::fs;
use std::io;
use std::path::Path;

/*
 * Collision-avoidance naming for files placed into a folder that may
 * already contain a file of the same name. The alternate name follows the
 * pattern `{stem}_{counter}{ext}`, where the counter is one greater than
 * the highest counter already present in the folder for that stem/ext
 * pair. Pure functions of the directory listing; nothing here writes.
 */

/*
 * Splits a file name into stem and extension at the last dot. The dot
 * stays with the extension. A leading dot is part of the stem, so dotfiles
 * like `.bashrc` have no extension.
 */
pub(crate) fn split_stem_ext(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(pos) if pos > 0 => file_name.split_at(pos),
        _ => (file_name, ""),
    }
}

/*
 * Returns the next free numbered variant of `file_name` in `folder`:
 * scans the folder for names matching exactly `{stem}_{integer}{ext}`,
 * takes the highest integer found (0 if none) and returns the name with
 * that integer plus one. Names whose suffix is not a plain integer do not
 * participate.
 */
pub fn next_available_name(folder: &Path, file_name: &str) -> io::Result<String> {
    let (stem, ext) = split_stem_ext(file_name);
    let pattern = format!("^{}_(\\d+){}$", regex::escape(stem), regex::escape(ext));
    let numbered = Regex::new(&pattern).ok();

    let mut max_counter: u64 = 0;
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some(re) = numbered.as_ref()
            && let Some(caps) = re.captures(name)
            && let Ok(counter) = caps[1].parse::<u64>()
        {
            max_counter = max_counter.max(counter);
        }
    }
    Ok(format!("{stem}_{}{ext}", max_counter + 1))
}

/*
 * Returns `file_name` unchanged when nothing in `folder` uses it yet,
 * otherwise falls through to `next_available_name`.
 */
pub fn resolve_available_name(folder: &Path, file_name: &str) -> io::Result<String> {
    if folder.join(file_name).exists() {
        next_available_name(folder, file_name)
    } else {
        Ok(file_name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_split_stem_ext_variants() {
        assert_eq!(split_stem_ext("a.txt"), ("a", ".txt"));
        assert_eq!(split_stem_ext("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_stem_ext("Makefile"), ("Makefile", ""));
        assert_eq!(split_stem_ext(".bashrc"), (".bashrc", ""));
    }

    #[test]
    fn test_resolve_returns_name_unchanged_when_free() -> io::Result<()> {
        let dir = tempdir()?;
        File::create(dir.path().join("other.txt"))?.sync_all()?;

        let resolved = resolve_available_name(dir.path(), "report.txt")?;
        assert_eq!(resolved, "report.txt");
        Ok(())
    }

    #[test]
    fn test_next_available_name_counts_past_highest_suffix() -> io::Result<()> {
        let dir = tempdir()?;
        File::create(dir.path().join("a.txt"))?.sync_all()?;
        File::create(dir.path().join("a_1.txt"))?.sync_all()?;
        File::create(dir.path().join("a_3.txt"))?.sync_all()?;
        // Non-numeric suffix must not participate in the counter.
        File::create(dir.path().join("a_x.txt"))?.sync_all()?;

        let resolved = resolve_available_name(dir.path(), "a.txt")?;
        assert_eq!(resolved, "a_4.txt");
        Ok(())
    }

    #[test]
    fn test_next_available_name_starts_at_one() -> io::Result<()> {
        let dir = tempdir()?;
        File::create(dir.path().join("b.txt"))?.sync_all()?;

        let resolved = resolve_available_name(dir.path(), "b.txt")?;
        assert_eq!(resolved, "b_1.txt");
        Ok(())
    }

    #[test]
    fn test_next_available_name_without_extension() -> io::Result<()> {
        let dir = tempdir()?;
        File::create(dir.path().join("Makefile"))?.sync_all()?;
        File::create(dir.path().join("Makefile_2"))?.sync_all()?;

        let resolved = resolve_available_name(dir.path(), "Makefile")?;
        assert_eq!(resolved, "Makefile_3");
        Ok(())
    }

    #[test]
    fn test_other_stems_do_not_influence_counter() -> io::Result<()> {
        let dir = tempdir()?;
        File::create(dir.path().join("a.txt"))?.sync_all()?;
        File::create(dir.path().join("ab_7.txt"))?.sync_all()?;
        File::create(dir.path().join("a_2.log"))?.sync_all()?;

        let resolved = resolve_available_name(dir.path(), "a.txt")?;
        assert_eq!(resolved, "a_1.txt");
        Ok(())
    }

    #[test]
    fn test_missing_folder_is_an_error() {
        let result = next_available_name(Path::new("no_such_folder_here"), "a.txt");
        assert!(result.is_err());
    }
}
