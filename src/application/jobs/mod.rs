pub mod fetch_file_content;

pub use fetch_file_content::{
    fetch_callback, CallbackRegistry, FetchCallback, FetchFileContentHandler, FetchFileContentInput,
    FetchFileContentJob, FetchFileContentListener, FetchFileContentOutput, FileAtCommit,
};
