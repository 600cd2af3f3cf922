//! Eventual-consistency retry tests.

#[cfg(test)]
mod tests {
    use mpustack_s3_core::memory::Operation;
    use mpustack_s3_core::{ClientError, InMemoryStorageClient, UploadError};
    use mpustack_s3_model::{Blob, Payload, PutConfiguration};

    use crate::{memory_store, patterned_bytes, tiny_config};

    fn multipart() -> PutConfiguration {
        PutConfiguration::builder()
            .multipart()
            .build()
            .expect("valid configuration")
    }

    #[tokio::test]
    async fn test_should_retry_first_part_while_upload_is_invisible() {
        let client = InMemoryStorageClient::new(&tiny_config()).with_visibility_lag(1);
        let (client, store, container) = memory_store(client, &tiny_config(), "lag").expect("store");
        let data = patterned_bytes(10);

        store
            .put_blob(&container, &Blob::new("k", Payload::from_bytes(data.clone())), Some(&multipart()))
            .await
            .expect("upload survives one invisible request");

        let parts: Vec<_> = client
            .requests_for(Operation::UploadPart)
            .into_iter()
            .map(|r| r.part_number)
            .collect();
        assert_eq!(parts, vec![Some(1), Some(1), Some(2), Some(3)]);
        let object = client.get_object(&container, "k").expect("object stored");
        assert_eq!(&object.data[..], &data[..]);
    }

    #[tokio::test]
    async fn test_should_abort_when_upload_stays_invisible() {
        let client = InMemoryStorageClient::new(&tiny_config()).with_visibility_lag(2);
        let (client, store, container) = memory_store(client, &tiny_config(), "lag").expect("store");

        let err = store
            .put_blob(
                &container,
                &Blob::new("k", Payload::from_bytes(patterned_bytes(10))),
                Some(&multipart()),
            )
            .await
            .expect_err("two misses are fatal");

        assert!(matches!(err, UploadError::Client(ClientError::KeyNotFound { .. })));
        assert_eq!(client.requests_for(Operation::UploadPart).len(), 2);
        assert_eq!(client.requests_for(Operation::AbortMultipartUpload).len(), 1);
        assert!(client.in_progress_uploads(&container).is_empty());
        assert!(client.get_object(&container, "k").is_none());
    }

    #[tokio::test]
    async fn test_should_retry_injected_key_not_found_on_third_part() {
        let (client, store, container) =
            memory_store(InMemoryStorageClient::new(&tiny_config()), &tiny_config(), "kn")
                .expect("store");
        client.fail_part(3, ClientError::key_not_found(&container, "k", None));

        store
            .put_blob(
                &container,
                &Blob::new("k", Payload::from_bytes(patterned_bytes(10))),
                Some(&multipart()),
            )
            .await
            .expect("retry succeeds");

        let third: Vec<_> = client
            .requests_for(Operation::UploadPart)
            .into_iter()
            .filter(|r| r.part_number == Some(3))
            .collect();
        assert_eq!(third.len(), 2);
        assert_eq!(
            client.get_object(&container, "k").and_then(|o| o.parts_count),
            Some(3)
        );
    }
}
