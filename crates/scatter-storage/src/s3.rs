//! AWS S3 data plane. Buckets are containers; S3 has no resource group or
//! storage account tier, so only [`DataPlane`] and [`Container`] exist here.

use std::sync::Arc;

use aws_sdk_s3::Client;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::SdkError;
use aws_smithy_types::byte_stream::ByteStream;

use crate::error::StorageError;
use crate::service::{BoxFuture, Container, ContainerParams, DataPlane, validate_object_key};

pub struct S3DataPlane {
    client: Client,
    region: String,
}

impl S3DataPlane {
    pub fn new(client: Client, region: impl Into<String>) -> Self {
        Self {
            client,
            region: region.into(),
        }
    }

    /// Build a client from the default credential chain.
    pub async fn from_env(region: &str) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;
        Self::new(Client::new(&config), region)
    }
}

fn http_status<E>(err: &SdkError<E, HttpResponse>) -> Option<u16> {
    err.raw_response().map(|r| r.status().as_u16())
}

impl DataPlane for S3DataPlane {
    fn container_exists<'a>(&'a self, container: &'a str) -> BoxFuture<'a, Result<bool, StorageError>> {
        Box::pin(async move {
            match self.client.head_bucket().bucket(container).send().await {
                Ok(_) => Ok(true),
                Err(e) => match http_status(&e) {
                    Some(404) => Ok(false),
                    Some(401 | 403) => Err(StorageError::Unauthorized(format!(
                        "head_bucket {container}: access denied"
                    ))),
                    _ => {
                        let err = e.into_service_error();
                        if err.is_not_found() {
                            Ok(false)
                        } else {
                            Err(StorageError::HeadBucket(err.to_string()))
                        }
                    }
                },
            }
        })
    }

    fn create_container<'a>(
        &'a self,
        container: &'a str,
        _params: &'a ContainerParams,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let mut builder = self.client.create_bucket().bucket(container);

            if self.region != "us-east-1" {
                builder = builder.create_bucket_configuration(
                    aws_sdk_s3::types::CreateBucketConfiguration::builder()
                        .location_constraint(aws_sdk_s3::types::BucketLocationConstraint::from(
                            self.region.as_str(),
                        ))
                        .build(),
                );
            }

            if let Err(e) = builder.send().await {
                let err = e.into_service_error();
                if err.is_bucket_already_owned_by_you() {
                    return Err(StorageError::AlreadyExists(format!("bucket {container}")));
                }
                return Err(StorageError::CreateBucket(err.to_string()));
            }

            // Public access is always denied.
            self.client
                .put_public_access_block()
                .bucket(container)
                .public_access_block_configuration(
                    aws_sdk_s3::types::PublicAccessBlockConfiguration::builder()
                        .block_public_acls(true)
                        .ignore_public_acls(true)
                        .block_public_policy(true)
                        .restrict_public_buckets(true)
                        .build(),
                )
                .send()
                .await
                .map_err(|e| StorageError::PutPublicAccessBlock(e.into_service_error().to_string()))?;

            tracing::info!(bucket = %container, region = %self.region, "S3 bucket created");
            Ok(())
        })
    }

    fn open_container(&self, container: &str) -> Result<Arc<dyn Container>, StorageError> {
        Ok(Arc::new(S3Container {
            client: self.client.clone(),
            bucket: container.to_string(),
        }))
    }
}

pub struct S3Container {
    client: Client,
    bucket: String,
}

impl Container for S3Container {
    fn name(&self) -> &str {
        &self.bucket
    }

    fn is_hierarchical(&self) -> bool {
        false
    }

    /// Prefixes are implicit in S3.
    fn directory_exists<'a>(&'a self, _path: &'a str) -> BoxFuture<'a, Result<bool, StorageError>> {
        Box::pin(async { Ok(true) })
    }

    fn create_directory<'a>(&'a self, _path: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async { Ok(()) })
    }

    fn write_object<'a>(
        &'a self,
        key: &'a str,
        body: Vec<u8>,
        overwrite: bool,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            validate_object_key(key)?;
            let mut req = self
                .client
                .put_object()
                .bucket(&self.bucket)
                .key(key)
                .body(ByteStream::from(body));

            if !overwrite {
                req = req.if_none_match("*");
            }

            req.send().await.map_err(|e| {
                if http_status(&e) == Some(412) {
                    StorageError::AlreadyExists(format!("object {key}"))
                } else {
                    StorageError::PutObject(e.into_service_error().to_string())
                }
            })?;

            Ok(())
        })
    }
}
