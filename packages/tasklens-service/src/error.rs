pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Unauthorized: {message}")]
	Unauthorized { message: String },
	#[error("Tenant mismatch: {message}")]
	TenantMismatch { message: String },
	#[error("{message}")]
	SemanticUnavailable { message: String },
	#[error("Timed out: {message}")]
	Timeout { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Qdrant error: {message}")]
	Qdrant { message: String },
}
impl From<tasklens_storage::Error> for Error {
	fn from(err: tasklens_storage::Error) -> Self {
		match err {
			tasklens_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			tasklens_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			tasklens_storage::Error::Qdrant(inner) => Self::Qdrant { message: inner.to_string() },
		}
	}
}

impl From<color_eyre::Report> for Error {
	fn from(err: color_eyre::Report) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
