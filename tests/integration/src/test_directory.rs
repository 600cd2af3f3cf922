//! Directory marker tests.

#[cfg(test)]
mod tests {
    use mpustack_s3_core::InMemoryStorageClient;
    use mpustack_s3_core::blobstore::DIRECTORY_CONTENT_TYPE;
    use mpustack_s3_core::memory::Operation;
    use mpustack_s3_model::DirectoryOptions;

    use crate::{memory_store, tiny_config};

    #[tokio::test]
    async fn test_should_create_encrypted_directory() {
        let (client, store, container) =
            memory_store(InMemoryStorageClient::new(&tiny_config()), &tiny_config(), "dir")
                .expect("store");

        store
            .create_directory(&container, "reports/2024", DirectoryOptions::ENCRYPT)
            .await
            .expect("create directory");

        let marker = client
            .get_object(&container, "reports/2024/")
            .expect("marker stored");
        assert_eq!(marker.size, 0);
        assert_eq!(marker.metadata.content_type.as_deref(), Some(DIRECTORY_CONTENT_TYPE));
        assert_eq!(marker.options.sse_algorithm.as_deref(), Some("AES256"));

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].operation, Operation::PutObject);
    }

    #[tokio::test]
    async fn test_should_create_unencrypted_directory() {
        let (client, store, container) =
            memory_store(InMemoryStorageClient::new(&tiny_config()), &tiny_config(), "dir")
                .expect("store");

        store
            .create_directory(&container, "scratch/", DirectoryOptions::NO_ENCRYPT)
            .await
            .expect("create directory");

        let marker = client.get_object(&container, "scratch/").expect("marker stored");
        assert_eq!(marker.options.sse_algorithm, None);
        assert_eq!(client.object_count(&container), 1);
    }
}
