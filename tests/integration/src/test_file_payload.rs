//! File-backed payload tests.

#[cfg(test)]
mod tests {
    use std::io::Write;

    use mpustack_s3_core::memory::Operation;
    use mpustack_s3_core::{InMemoryStorageClient, UploadError};
    use mpustack_s3_model::{Blob, Payload, PutConfiguration};

    use crate::{memory_store, patterned_bytes, tiny_config};

    fn multipart() -> PutConfiguration {
        PutConfiguration::builder()
            .multipart()
            .build()
            .expect("valid configuration")
    }

    fn temp_file(data: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(data).expect("write temp file");
        file
    }

    #[tokio::test]
    async fn test_should_upload_file_in_parts() {
        let (client, store, container) =
            memory_store(InMemoryStorageClient::new(&tiny_config()), &tiny_config(), "file")
                .expect("store");
        let data = patterned_bytes(11);
        let file = temp_file(&data);
        let payload = Payload::from_file(file.path()).with_content_length(11);

        store
            .put_blob(&container, &Blob::new("from-disk", payload), Some(&multipart()))
            .await
            .expect("file upload");

        assert_eq!(client.requests_for(Operation::UploadPart).len(), 3);
        let object = client.get_object(&container, "from-disk").expect("object stored");
        assert_eq!(&object.data[..], &data[..]);
    }

    #[tokio::test]
    async fn test_should_put_small_file_directly() {
        let (client, store, container) =
            memory_store(InMemoryStorageClient::new(&tiny_config()), &tiny_config(), "file")
                .expect("store");
        let file = temp_file(b"tiny");
        let payload = Payload::from_file(file.path()).with_content_length(4);

        store
            .put_blob(&container, &Blob::new("tiny", payload), Some(&multipart()))
            .await
            .expect("single put");

        let object = client.get_object(&container, "tiny").expect("object stored");
        assert_eq!(&object.data[..], b"tiny");
        assert!(client.requests_for(Operation::UploadPart).is_empty());
    }

    #[tokio::test]
    async fn test_should_require_declared_length_for_file() {
        let (client, store, container) =
            memory_store(InMemoryStorageClient::new(&tiny_config()), &tiny_config(), "file")
                .expect("store");
        let file = temp_file(&patterned_bytes(11));

        let err = store
            .put_blob(
                &container,
                &Blob::new("undeclared", Payload::from_file(file.path())),
                Some(&multipart()),
            )
            .await
            .expect_err("length unknown");

        assert!(matches!(err, UploadError::MissingContentLength { .. }));
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_should_abort_when_file_is_truncated() {
        let (client, store, container) =
            memory_store(InMemoryStorageClient::new(&tiny_config()), &tiny_config(), "file")
                .expect("store");
        let file = temp_file(&patterned_bytes(6));
        let payload = Payload::from_file(file.path()).with_content_length(11);

        let err = store
            .put_blob(&container, &Blob::new("short", payload), Some(&multipart()))
            .await
            .expect_err("file shorter than declared");

        assert!(matches!(err, UploadError::Payload(_)));
        assert_eq!(client.requests_for(Operation::AbortMultipartUpload).len(), 1);
        assert!(client.get_object(&container, "short").is_none());
    }
}
