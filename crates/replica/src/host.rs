//! Object-store host decoding.
//!
//! S3-compatible providers encode the bucket and region in the host name.
//! Recognised providers are addressed path-style through their regional
//! endpoint; any other host is taken as a plain AWS bucket name.

use regex::Regex;
use std::sync::LazyLock;

static LOCALHOST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:(.+)\.)?localhost$").expect("LOCALHOST_RE should compile"));
static BACKBLAZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(.+)\.)?s3\.([^.]+)\.backblazeb2\.com$").expect("BACKBLAZE_RE should compile")
});
static FILEBASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(.+)\.)?s3\.filebase\.com$").expect("FILEBASE_RE should compile")
});
static DIGITAL_OCEAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(.+)\.)?([^.]+)\.digitaloceanspaces\.com$")
        .expect("DIGITAL_OCEAN_RE should compile")
});
static SCALEWAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(.+)\.)?s3\.([^.]+)\.scw\.cloud$").expect("SCALEWAY_RE should compile")
});
static LINODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(.+)\.)?([^.]+)\.linodeobjects\.com$").expect("LINODE_RE should compile")
});

/// Region assumed for local S3-compatible servers.
const LOCALHOST_REGION: &str = "us-east-1";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct S3Host {
    pub bucket: String,
    pub region: String,
    /// Empty for AWS itself; otherwise a full `scheme://host[:port]` URL.
    pub endpoint: String,
    pub force_path_style: bool,
}

/// Decodes the host component of an `s3://` descriptor.
pub fn parse_host(host: &str) -> S3Host {
    let (name, port) = split_host_port(host);

    let capture = |re: &Regex| {
        re.captures(name).map(|c| {
            let group = |i| c.get(i).map_or(String::new(), |m| m.as_str().to_string());
            (group(1), group(2))
        })
    };

    let mut scheme = "https";
    let (bucket, region, endpoint) = if let Some((bucket, _)) = capture(&LOCALHOST_RE) {
        scheme = "http";
        (bucket, LOCALHOST_REGION.to_string(), "localhost".to_string())
    } else if let Some((bucket, region)) = capture(&BACKBLAZE_RE) {
        let endpoint = format!("s3.{region}.backblazeb2.com");
        (bucket, region, endpoint)
    } else if let Some((bucket, _)) = capture(&FILEBASE_RE) {
        (bucket, String::new(), "s3.filebase.com".to_string())
    } else if let Some((bucket, region)) = capture(&DIGITAL_OCEAN_RE) {
        let endpoint = format!("{region}.digitaloceanspaces.com");
        (bucket, region, endpoint)
    } else if let Some((bucket, region)) = capture(&SCALEWAY_RE) {
        let endpoint = format!("s3.{region}.scw.cloud");
        (bucket, region, endpoint)
    } else if let Some((bucket, region)) = capture(&LINODE_RE) {
        let endpoint = format!("{region}.linodeobjects.com");
        (bucket, region, endpoint)
    } else {
        // Plain AWS bucket: virtual-hosted addressing, default endpoint.
        return S3Host {
            bucket: name.to_string(),
            ..S3Host::default()
        };
    };

    let endpoint = match port {
        Some(port) => format!("{scheme}://{endpoint}:{port}"),
        None => format!("{scheme}://{endpoint}"),
    };

    S3Host {
        bucket,
        region,
        endpoint,
        force_path_style: true,
    }
}

/// Splits `host:port`, leaving hosts without a single port separator intact.
fn split_host_port(host: &str) -> (&str, Option<&str>) {
    if let Some(rest) = host.strip_prefix('[') {
        return match rest.split_once(']') {
            Some((name, tail)) => (name, tail.strip_prefix(':').filter(|p| !p.is_empty())),
            None => (host, None),
        };
    }
    match host.split_once(':') {
        Some((name, port)) if !port.is_empty() && !port.contains(':') => (name, Some(port)),
        _ => (host, None),
    }
}
