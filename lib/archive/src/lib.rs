//! Object-archive augmentation (spec §4.5 step 15): after a successful
//! compile, append a `garble/debugSrc` member to the package's object
//! archive holding a gzip+tar bundle of the rewritten sources, so a later
//! `shroud reverse` can map an obfuscated stack trace back to the original.
//!
//! Also writes (and reads back) a `shroud/names.json` member. This is not
//! one of spec.md's named members; it is this engine's stand-in for
//! "loading the obfuscated view of a dependency" (spec §3
//! `loaded_package`), since nothing in this workspace reads real compiler
//! export data. A dependent package's compile hook reads this member out
//! of the dependency's archive to resolve whether a linkname target or a
//! cross-package struct field survived renaming.

use core::{Error, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read, Write};
use std::path::Path;

pub const DEBUG_SRC_MEMBER: &str = "garble/debugSrc";
pub const NAME_MAP_MEMBER: &str = "shroud/names.json";

fn read_existing(path: &Path) -> Result<Vec<(String, Vec<u8>)>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = File::open(path)?;
    let mut archive = ar::Archive::new(file);
    let mut out = Vec::new();
    while let Some(entry) = archive.next_entry() {
        let mut entry =
            entry.map_err(|e| Error::internal(format!("reading archive member: {}", e)))?;
        let name = String::from_utf8_lossy(entry.header().identifier()).into_owned();
        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        out.push((name, data));
    }
    Ok(out)
}

fn write_members(path: &Path, members: Vec<(String, Vec<u8>)>) -> Result<()> {
    let tmp = path.with_extension("shroud-tmp");
    {
        let out = File::create(&tmp)?;
        let mut builder = ar::Builder::new(out);
        for (name, data) in members {
            let header = ar::Header::new(name.into_bytes(), data.len() as u64);
            builder
                .append(&header, Cursor::new(data))
                .map_err(|e| Error::internal(format!("writing archive member: {}", e)))?;
        }
    }
    std::fs::rename(tmp, path)?;
    Ok(())
}

fn gzip_tar(rewritten: &[(String, String)]) -> Result<Vec<u8>> {
    let mut tar_bytes = Vec::new();
    {
        let mut builder = tar::Builder::new(&mut tar_bytes);
        for (name, source) in rewritten {
            let mut header = tar::Header::new_gnu();
            header.set_size(source.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, name, source.as_bytes())
                .map_err(|e| Error::internal(format!("packing debug source: {}", e)))?;
        }
        builder
            .finish()
            .map_err(|e| Error::internal(format!("packing debug source: {}", e)))?;
    }
    let mut gz = GzEncoder::new(Vec::new(), Compression::default());
    gz.write_all(&tar_bytes)?;
    Ok(gz.finish()?)
}

fn replace_member(path: &Path, name: &str, data: Vec<u8>) -> Result<()> {
    let mut members = read_existing(path)?;
    members.retain(|(existing, _)| existing != name);
    members.push((name.to_string(), data));
    write_members(path, members)
}

/// Append (or replace) the `garble/debugSrc` member of `archive_path`.
pub fn append_debug_src(archive_path: &Path, rewritten: &[(String, String)]) -> Result<()> {
    log::debug!(
        "{}: packing {} rewritten source(s) into {}",
        archive_path.display(),
        rewritten.len(),
        DEBUG_SRC_MEMBER
    );
    replace_member(archive_path, DEBUG_SRC_MEMBER, gzip_tar(rewritten)?)
}

/// Read back a previously-appended `garble/debugSrc` member, unpacking it
/// into `(path, source)` pairs (used by `shroud reverse`).
pub fn read_debug_src(archive_path: &Path) -> Result<Option<Vec<(String, String)>>> {
    for (name, data) in read_existing(archive_path)? {
        if name != DEBUG_SRC_MEMBER {
            continue;
        }
        let mut gz = flate2::read::GzDecoder::new(Cursor::new(data));
        let mut tar_bytes = Vec::new();
        gz.read_to_end(&mut tar_bytes)?;

        let mut archive = tar::Archive::new(Cursor::new(tar_bytes));
        let mut out = Vec::new();
        for entry in archive.entries()? {
            let mut entry = entry?;
            let path = entry.path()?.to_string_lossy().into_owned();
            let mut content = String::new();
            entry.read_to_string(&mut content)?;
            out.push((path, content));
        }
        return Ok(Some(out));
    }
    Ok(None)
}

/// Record this package's `original -> emitted` declaration map.
pub fn write_name_map(archive_path: &Path, names: &HashMap<String, String>) -> Result<()> {
    let json = serde_json::to_vec(names)?;
    replace_member(archive_path, NAME_MAP_MEMBER, json)
}

/// Load a dependency's `original -> emitted` declaration map, if it was
/// ever obfuscated (a package the privacy predicate rejected never gets
/// one, which is not an error: it just means nothing in it was renamed).
pub fn read_name_map(archive_path: &Path) -> Result<Option<HashMap<String, String>>> {
    for (name, data) in read_existing(archive_path)? {
        if name == NAME_MAP_MEMBER {
            return Ok(Some(serde_json::from_slice(&data)?));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn empty_archive() -> tempfile::TempPath {
        let file = tempfile::NamedTempFile::new().unwrap();
        {
            let builder = ar::Builder::new(File::create(file.path()).unwrap());
            drop(builder);
        }
        file.into_temp_path()
    }

    #[test]
    fn debug_src_round_trips() {
        let path = empty_archive();
        let sources = vec![
            ("a.go".to_string(), "package p\n".to_string()),
            ("b.go".to_string(), "package p\n\nfunc f() {}\n".to_string()),
        ];
        append_debug_src(&path, &sources).unwrap();

        let read_back = read_debug_src(&path).unwrap().unwrap();
        assert_eq!(read_back.len(), 2);
        assert!(read_back.iter().any(|(n, c)| n == "a.go" && c == "package p\n"));
    }

    #[test]
    fn name_map_round_trips() {
        let path = empty_archive();
        let mut names = HashMap::new();
        names.insert("Foo".to_string(), "_abc123".to_string());
        write_name_map(&path, &names).unwrap();

        let read_back = read_name_map(&path).unwrap().unwrap();
        assert_eq!(read_back.get("Foo"), Some(&"_abc123".to_string()));
    }

    #[test]
    fn both_members_coexist() {
        let path = empty_archive();
        append_debug_src(&path, &[("a.go".to_string(), "package p\n".to_string())]).unwrap();
        let mut names = HashMap::new();
        names.insert("Foo".to_string(), "Foo".to_string());
        write_name_map(&path, &names).unwrap();

        assert!(read_debug_src(&path).unwrap().is_some());
        assert!(read_name_map(&path).unwrap().is_some());
    }

    #[test]
    fn missing_name_map_is_none_not_an_error() {
        let path = empty_archive();
        assert!(read_name_map(&path).unwrap().is_none());
    }
}
