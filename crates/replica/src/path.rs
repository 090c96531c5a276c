/// Returns the shortest path equivalent to `path` by purely lexical processing.
///
/// Duplicate separators and `.` segments are dropped, `..` consumes the
/// preceding segment, and `..` at the root of an absolute path is discarded.
/// An empty result is `"."`.
pub fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if rooted => {}
                _ => segments.push(".."),
            },
            segment => segments.push(segment),
        }
    }

    let joined = segments.join("/");
    if rooted {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::clean_path;

    #[test]
    fn cleans_lexically() {
        let cases = [
            ("", "."),
            ("/", "/"),
            ("abc", "abc"),
            ("abc/def/", "abc/def"),
            ("a//b///c", "a/b/c"),
            ("./a/./b/.", "a/b"),
            ("/../a", "/a"),
            ("a/../..", ".."),
            ("../../a/b/..", "../../a"),
            ("/tmp/./db.sqlite", "/tmp/db.sqlite"),
            ("///tmp//x/../y", "/tmp/y"),
            ("abc/..", "."),
        ];
        for (input, expected) in cases {
            assert_eq!(clean_path(input), expected, "clean_path({input:?})");
        }
    }
}
