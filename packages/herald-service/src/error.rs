pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Storage(#[from] herald_storage::Error),
	#[error(transparent)]
	ParseEnum(#[from] herald_domain::ParseEnumError),
	#[error(transparent)]
	Serialization(#[from] serde_json::Error),
	#[error("{0}")]
	Message(String),
}
