use crate::descriptor::{FILE_SCHEME, ReplicaUrl, S3_SCHEME, parse_replica_url};
use crate::error::DescriptorError;
use crate::host::parse_host;
use core_types::Credentials;
use std::path::PathBuf;

/// Settings for a replica stored in a local directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileClientConfig {
    pub path: PathBuf,
}

/// Settings for an S3-compatible object-store client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3ClientConfig {
    pub bucket: String,
    pub region: String,
    pub endpoint: String,
    /// Object key prefix under which the replica lives.
    pub path: String,
    pub force_path_style: bool,
    pub credentials: Credentials,
}

/// The client a replication engine should build for a replica.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplicaClientConfig {
    File(FileClientConfig),
    S3(S3ClientConfig),
}

impl ReplicaClientConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            ReplicaClientConfig::File(_) => FILE_SCHEME,
            ReplicaClientConfig::S3(_) => S3_SCHEME,
        }
    }
}

/// Connection parameters derived from a descriptor. Computed fresh for every
/// session open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub url: ReplicaUrl,
    pub client: ReplicaClientConfig,
}

impl ConnectionParams {
    /// Parses `raw` and resolves the client settings for its scheme.
    ///
    /// Credentials are only attached to object-store clients; they never come
    /// from the descriptor itself.
    pub fn from_descriptor(raw: &str, credentials: &Credentials) -> Result<Self, DescriptorError> {
        let url = parse_replica_url(raw)?;

        let client = match url.scheme.as_str() {
            FILE_SCHEME => ReplicaClientConfig::File(FileClientConfig {
                path: PathBuf::from(&url.path),
            }),
            S3_SCHEME => {
                let host = parse_host(&url.host);
                if host.bucket.is_empty() {
                    return Err(DescriptorError::MissingBucket {
                        raw: raw.to_string(),
                    });
                }
                // A descriptor naming only the bucket replicates to its root.
                let prefix = match url.path.as_str() {
                    "." => String::new(),
                    path => path.to_string(),
                };
                ReplicaClientConfig::S3(S3ClientConfig {
                    bucket: host.bucket,
                    region: host.region,
                    endpoint: host.endpoint,
                    path: prefix,
                    force_path_style: host.force_path_style,
                    credentials: credentials.clone(),
                })
            }
            other => {
                return Err(DescriptorError::UnsupportedScheme {
                    raw: raw.to_string(),
                    scheme: other.to_string(),
                });
            }
        };

        tracing::debug!(
            scheme = %url.scheme,
            host = %url.host,
            path = %url.path,
            "resolved replica descriptor"
        );

        Ok(Self { url, client })
    }

    /// The name the replica is attached under, e.g. `s3`.
    pub fn replica_name(&self) -> &str {
        &self.url.scheme
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s3_descriptor_resolves_object_store_client() {
        let creds = Credentials::new("AKID", "secret");
        let params =
            ConnectionParams::from_descriptor("s3://test.nyc3.digitaloceanspaces.com/backups/app.db", &creds)
                .unwrap();

        assert_eq!(params.replica_name(), "s3");
        assert_eq!(
            params.client,
            ReplicaClientConfig::S3(S3ClientConfig {
                bucket: "test".to_string(),
                region: "nyc3".to_string(),
                endpoint: "https://nyc3.digitaloceanspaces.com".to_string(),
                path: "backups/app.db".to_string(),
                force_path_style: true,
                credentials: creds,
            })
        );
    }

    #[test]
    fn file_descriptor_resolves_directory_client() {
        let params =
            ConnectionParams::from_descriptor("file:///srv/replicas/./app", &Credentials::default())
                .unwrap();

        assert_eq!(params.client.kind(), "file");
        assert_eq!(
            params.client,
            ReplicaClientConfig::File(FileClientConfig {
                path: PathBuf::from("/srv/replicas/app"),
            })
        );
    }

    #[test]
    fn unknown_scheme_is_rejected() {
        let err = ConnectionParams::from_descriptor("ftp://host/db", &Credentials::default())
            .unwrap_err();
        assert_eq!(
            err,
            DescriptorError::UnsupportedScheme {
                raw: "ftp://host/db".to_string(),
                scheme: "ftp".to_string(),
            }
        );
    }

    #[test]
    fn bucket_only_descriptor_replicates_to_bucket_root() {
        let params =
            ConnectionParams::from_descriptor("s3://my-bucket", &Credentials::default()).unwrap();

        assert_eq!(params.url.path, ".");
        let ReplicaClientConfig::S3(s3) = params.client else {
            panic!("expected an s3 client");
        };
        assert_eq!(s3.bucket, "my-bucket");
        assert_eq!(s3.path, "");
    }

    #[test]
    fn s3_descriptor_without_authority_is_rejected() {
        let err = ConnectionParams::from_descriptor("s3:bucket/prefix", &Credentials::default())
            .unwrap_err();
        assert_eq!(
            err,
            DescriptorError::MissingBucket {
                raw: "s3:bucket/prefix".to_string(),
            }
        );

        let err = ConnectionParams::from_descriptor("s3://localhost:9000/prefix", &Credentials::default())
            .unwrap_err();
        assert!(matches!(err, DescriptorError::MissingBucket { .. }));
    }

    #[test]
    fn missing_scheme_propagates() {
        let err = ConnectionParams::from_descriptor("backups/app.db", &Credentials::default())
            .unwrap_err();
        assert!(matches!(err, DescriptorError::MissingScheme { .. }));
    }
}
