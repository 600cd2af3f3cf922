//! Failure and abort tests.

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

    fn ten_bytes() -> Blob {
        Blob::new("k", Payload::from_bytes(patterned_bytes(10)))
    }

    #[tokio::test]
    async fn test_should_abort_once_on_part_failure() {
        let (client, store, container) =
            memory_store(InMemoryStorageClient::new(&tiny_config()), &tiny_config(), "abort")
                .expect("store");
        client.fail_part(2, ClientError::service("InternalError", "disk on fire"));

        let err = store
            .put_blob(&container, &ten_bytes(), Some(&multipart()))
            .await
            .expect_err("part 2 fails");

        assert!(matches!(
            err,
            UploadError::Client(ClientError::Service { ref code, .. }) if code == "InternalError"
        ));
        assert_eq!(client.requests_for(Operation::UploadPart).len(), 2);
        assert_eq!(client.requests_for(Operation::AbortMultipartUpload).len(), 1);
        assert!(client.requests_for(Operation::CompleteMultipartUpload).is_empty());
        assert!(client.in_progress_uploads(&container).is_empty());
    }

    #[tokio::test]
    async fn test_should_abort_when_complete_fails() {
        let (client, store, container) =
            memory_store(InMemoryStorageClient::new(&tiny_config()), &tiny_config(), "abort")
                .expect("store");
        client.fail_complete(ClientError::service("InternalError", "try later"));

        store
            .put_blob(&container, &ten_bytes(), Some(&multipart()))
            .await
            .expect_err("complete fails");

        assert_eq!(client.requests_for(Operation::AbortMultipartUpload).len(), 1);
        assert!(client.in_progress_uploads(&container).is_empty());
        assert!(client.get_object(&container, "k").is_none());
    }

    #[tokio::test]
    async fn test_should_surface_original_error_when_abort_fails() {
        let (client, store, container) =
            memory_store(InMemoryStorageClient::new(&tiny_config()), &tiny_config(), "abort")
                .expect("store");
        client.fail_part(1, ClientError::service("SlowDown", "reduce request rate"));
        client.fail_abort(ClientError::service("AccessDenied", "denied"));

        let err = store
            .put_blob(&container, &ten_bytes(), Some(&multipart()))
            .await
            .expect_err("part 1 fails");

        assert!(matches!(
            err,
            UploadError::Client(ClientError::Service { ref code, .. }) if code == "SlowDown"
        ));
        assert_eq!(client.in_progress_uploads(&container).len(), 1);
    }

    #[tokio::test]
    async fn test_should_fail_for_missing_container_before_parts() {
        let (client, store, _container) =
            memory_store(InMemoryStorageClient::new(&tiny_config()), &tiny_config(), "abort")
                .expect("store");

        let err = store
            .put_blob("no-such-container", &ten_bytes(), Some(&multipart()))
            .await
            .expect_err("missing container");

        assert!(matches!(
            err,
            UploadError::Client(ClientError::Service { ref code, .. }) if code == "NoSuchBucket"
        ));
        assert!(client.requests_for(Operation::UploadPart).is_empty());
        assert!(client.requests_for(Operation::AbortMultipartUpload).is_empty());
    }
}
