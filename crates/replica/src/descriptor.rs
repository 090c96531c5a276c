use crate::error::DescriptorError;
use crate::path::clean_path;
use url::Url;

pub const FILE_SCHEME: &str = "file";
pub const S3_SCHEME: &str = "s3";

/// The three components of a replica descriptor.
///
/// `host` is empty for `file` descriptors. For remote descriptors `path` is the
/// object key prefix, without a leading separator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplicaUrl {
    pub scheme: String,
    pub host: String,
    pub path: String,
}

/// Parses a replica descriptor such as `s3://bucket/prefix` or `file:/var/db`.
///
/// Paths are cleaned lexically; the filesystem is never consulted.
pub fn parse_replica_url(raw: &str) -> Result<ReplicaUrl, DescriptorError> {
    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            return Err(DescriptorError::MissingScheme {
                raw: raw.to_string(),
                partial: parse_schemeless(raw),
            });
        }
        Err(source) => {
            return Err(DescriptorError::Syntax {
                raw: raw.to_string(),
                source,
            });
        }
    };

    if url.scheme() == FILE_SCHEME {
        // Everything after the scheme is a filesystem path, authority included.
        let rest = raw.split_once(':').map_or("", |(_, rest)| rest);
        return Ok(ReplicaUrl {
            scheme: FILE_SCHEME.to_string(),
            host: String::new(),
            path: clean_path(rest),
        });
    }

    let host = match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    };

    let decoded = urlencoding::decode(url.path())
        .map(|p| p.into_owned())
        .unwrap_or_else(|_| url.path().to_string());
    let cleaned = clean_path(&decoded);
    let path = cleaned.strip_prefix('/').unwrap_or(&cleaned).to_string();

    Ok(ReplicaUrl {
        scheme: url.scheme().to_string(),
        host,
        path,
    })
}

/// Best-effort split of a descriptor that has no scheme, for error reporting.
fn parse_schemeless(raw: &str) -> ReplicaUrl {
    let end = raw.find(['?', '#']).unwrap_or(raw.len());
    let raw = &raw[..end];

    let (host, path) = match raw.strip_prefix("//") {
        Some(rest) => match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        },
        None => ("", raw),
    };

    ReplicaUrl {
        scheme: String::new(),
        host: host.to_string(),
        path: path.to_string(),
    }
}
