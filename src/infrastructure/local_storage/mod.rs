pub mod local_blob_store;
