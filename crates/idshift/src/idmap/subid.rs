//! Subordinate ID files (`/etc/subuid`, `/etc/subgid`).

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use idshift_common::{ShiftError, ShiftResult};

/// A `name:start:count` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubIdRange {
    /// First host ID delegated to the user.
    pub start: u32,
    /// Number of IDs delegated.
    pub count: u32,
}

/// Read the first range for `user` (a name or numeric id) from `path`.
///
/// A missing file yields `Ok(None)`, as does a file without a usable line
/// for the user.
pub fn read_subid(path: &Path, user: &str) -> ShiftResult<Option<SubIdRange>> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ShiftError::io("read", path, e)),
    };

    Ok(parse_subid(&content, user))
}

fn parse_subid(content: &str, user: &str) -> Option<SubIdRange> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .find_map(|line| {
            let parts: Vec<&str> = line.split(':').collect();
            let [name, start, count] = parts.as_slice() else {
                tracing::debug!(line, "skipping malformed subid line");
                return None;
            };
            if *name != user {
                return None;
            }
            match (start.parse(), count.parse()) {
                (Ok(start), Ok(count)) => Some(SubIdRange { start, count }),
                _ => {
                    tracing::debug!(line, "skipping malformed subid line");
                    None
                }
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUBUID: &str = "\
# delegated ranges
alice:100000:65536
bob:165536:65536
1001:231072:65536
broken:line
bob:999:1
";

    #[test]
    fn finds_by_name_and_id() {
        assert_eq!(
            parse_subid(SUBUID, "alice"),
            Some(SubIdRange {
                start: 100_000,
                count: 65536
            })
        );
        assert_eq!(parse_subid(SUBUID, "1001").map(|r| r.start), Some(231_072));
    }

    #[test]
    fn first_line_wins() {
        assert_eq!(parse_subid(SUBUID, "bob").map(|r| r.start), Some(165_536));
    }

    #[test]
    fn unknown_user() {
        assert_eq!(parse_subid(SUBUID, "carol"), None);
        assert_eq!(parse_subid(SUBUID, "broken"), None);
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let found = read_subid(&dir.path().join("subuid"), "alice").unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subgid");
        fs::write(&path, SUBUID).unwrap();
        let found = read_subid(&path, "alice").unwrap().unwrap();
        assert_eq!(found.count, 65536);
    }
}
