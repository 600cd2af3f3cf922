//! Multipart upload end-to-end tests.

#[cfg(test)]
mod tests {
    use mpustack_core::MpuConfig;
    use mpustack_s3_core::checksums::compute_etag;
    use mpustack_s3_core::memory::Operation;
    use mpustack_s3_core::{ClientError, InMemoryStorageClient, UploadError};
    use mpustack_s3_model::{Blob, CannedAcl, Dialect, Payload, PutConfiguration, StorageClass};

    use crate::{memory_store, patterned_bytes, tiny_config};

    const MIB: usize = 1024 * 1024;

    #[tokio::test]
    async fn test_should_upload_100_mib_with_encryption() {
        let (client, store, container) =
            memory_store(InMemoryStorageClient::default(), &MpuConfig::default(), "mpu")
                .expect("store");
        let data = patterned_bytes(100 * MIB);
        let blob = Blob::new("big.bin", Payload::from_bytes(data.clone()));
        let config = PutConfiguration::builder()
            .multipart()
            .server_side_encryption()
            .build()
            .expect("valid configuration");

        let etag = store
            .put_blob(&container, &blob, Some(&config))
            .await
            .expect("multipart upload");

        assert!(etag.ends_with("-4\""), "composite etag, got {etag}");
        let object = client.get_object(&container, "big.bin").expect("object stored");
        assert_eq!(object.etag, etag);
        assert_eq!(object.size, (100 * MIB) as u64);
        assert_eq!(object.parts_count, Some(4));
        assert!(object.data[..] == data[..]);
        assert_eq!(object.options.sse_algorithm.as_deref(), Some("AES256"));

        let initiate = &client.requests_for(Operation::InitiateMultipartUpload)[0];
        assert_eq!(initiate.headers["x-amz-server-side-encryption"], "AES256");
        let parts = client.requests_for(Operation::UploadPart);
        assert_eq!(parts.len(), 4);
        for part in parts {
            assert!(part.headers.is_empty(), "part {:?} carried headers", part.part_number);
        }
        assert!(client.in_progress_uploads(&container).is_empty());
    }

    #[tokio::test]
    async fn test_should_grow_chunk_size_past_ceiling() {
        let (client, store, container) =
            memory_store(InMemoryStorageClient::default(), &tiny_config(), "grow").expect("store");
        // 13 bytes at 4-byte parts would need 4 parts; the ceiling is 3, so
        // chunks double to 8 bytes and 2 parts.
        let data = patterned_bytes(13);
        let config = PutConfiguration::builder()
            .multipart()
            .build()
            .expect("valid configuration");

        store
            .put_blob(&container, &Blob::new("k", Payload::from_bytes(data.clone())), Some(&config))
            .await
            .expect("multipart upload");

        let parts = client.requests_for(Operation::UploadPart);
        assert_eq!(
            parts.iter().map(|p| p.part_number).collect::<Vec<_>>(),
            vec![Some(1), Some(2)]
        );
        let object = client.get_object(&container, "k").expect("object stored");
        assert_eq!(&object.data[..], &data[..]);
    }

    #[tokio::test]
    async fn test_should_carry_acl_and_storage_class_to_final_object() {
        let (client, store, container) =
            memory_store(InMemoryStorageClient::default(), &tiny_config(), "opts").expect("store");
        let config = PutConfiguration::builder_for(Dialect::StorageClassAware)
            .multipart()
            .server_side_encryption_algorithm("aws:kms")
            .acl(CannedAcl::BucketOwnerFullControl)
            .storage_class(StorageClass::StandardIa)
            .build()
            .expect("valid configuration");

        store
            .put_blob(
                &container,
                &Blob::new("k", Payload::from_bytes(patterned_bytes(10)))
                    .with_content_type("application/octet-stream")
                    .with_user_metadata("owner", "ops"),
                Some(&config),
            )
            .await
            .expect("multipart upload");

        let object = client.get_object(&container, "k").expect("object stored");
        assert_eq!(object.options.sse_algorithm.as_deref(), Some("aws:kms"));
        assert_eq!(object.options.acl, CannedAcl::BucketOwnerFullControl);
        assert_eq!(object.options.storage_class, StorageClass::StandardIa);
        assert_eq!(
            object.metadata.user_metadata.get("owner").map(String::as_str),
            Some("ops")
        );
        for part in client.requests_for(Operation::UploadPart) {
            assert!(part.headers.is_empty());
        }
    }

    #[tokio::test]
    async fn test_should_ignore_encryption_for_generic_configuration() {
        let (client, store, container) =
            memory_store(InMemoryStorageClient::default(), &tiny_config(), "gen").expect("store");

        store
            .put_blob(
                &container,
                &Blob::new("k", Payload::from_bytes(patterned_bytes(10))),
                Some(&PutConfiguration::generic(true)),
            )
            .await
            .expect("multipart upload");

        let initiate = &client.requests_for(Operation::InitiateMultipartUpload)[0];
        assert!(initiate.headers.is_empty());
        let object = client.get_object(&container, "k").expect("object stored");
        assert_eq!(object.options.sse_algorithm, None);
    }

    #[tokio::test]
    async fn test_should_put_small_payload_in_one_request() {
        let (client, store, container) =
            memory_store(InMemoryStorageClient::default(), &tiny_config(), "small").expect("store");
        let config = PutConfiguration::builder()
            .multipart()
            .server_side_encryption()
            .build()
            .expect("valid configuration");

        let etag = store
            .put_blob(&container, &Blob::new("k", Payload::from_bytes("abcd")), Some(&config))
            .await
            .expect("single put");

        assert_eq!(etag, compute_etag(b"abcd"));
        assert_eq!(client.requests().len(), 1);
        let put = &client.requests_for(Operation::PutObject)[0];
        assert_eq!(put.headers["x-amz-server-side-encryption"], "AES256");
    }

    #[tokio::test]
    async fn test_should_reject_short_payload_on_either_path() {
        let (client, store, container) =
            memory_store(InMemoryStorageClient::default(), &tiny_config(), "short").expect("store");
        let config = PutConfiguration::builder()
            .multipart()
            .build()
            .expect("valid configuration");

        let small = Blob::new("small", Payload::from_bytes("ab").with_content_length(4));
        let err = store
            .put_blob(&container, &small, Some(&config))
            .await
            .expect_err("short single put");
        assert!(matches!(
            err,
            UploadError::Client(ClientError::Service { ref code, .. }) if code == "IncompleteBody"
        ));

        let large = Blob::new("large", Payload::from_bytes("abcdef").with_content_length(10));
        let err = store
            .put_blob(&container, &large, Some(&config))
            .await
            .expect_err("short multipart upload");
        assert!(matches!(err, UploadError::SliceMismatch { .. }));

        assert_eq!(client.object_count(&container), 0);
        assert!(client.in_progress_uploads(&container).is_empty());
    }
}
