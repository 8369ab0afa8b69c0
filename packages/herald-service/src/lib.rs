pub mod digest;
pub mod dispatch;
pub mod scan;

mod error;

pub use error::{Error, Result};

use std::sync::Arc;

use herald_config::Config;
use herald_storage::db::Db;
use herald_transport::{EmailTransport, PushTransport};

/// Shared pipeline state. Transports are optional; an entry whose channel has
/// no configured transport fails with a `channel_unconfigured` reason instead
/// of blocking the rest of the batch.
pub struct HeraldService {
	pub cfg: Config,
	pub db: Db,
	pub push: Option<Arc<dyn PushTransport>>,
	pub email: Option<Arc<dyn EmailTransport>>,
}
impl HeraldService {
	pub fn new(
		cfg: Config,
		db: Db,
		push: Option<Arc<dyn PushTransport>>,
		email: Option<Arc<dyn EmailTransport>>,
	) -> Self {
		Self { cfg, db, push, email }
	}
}
