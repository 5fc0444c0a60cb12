pub mod canonicalized_path_buf;

pub use canonicalized_path_buf::CanonicalizedPathBuf;
