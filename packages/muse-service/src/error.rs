pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure detail at the provider and store seams. Public service operations convert these into
/// sentinel outcomes and a log line; they never hand one to their caller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl From<muse_providers::Error> for Error {
	fn from(err: muse_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<muse_storage::Error> for Error {
	fn from(err: muse_storage::Error) -> Self {
		match err {
			muse_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			other => Self::Storage { message: other.to_string() },
		}
	}
}
