//! Throwaway Postgres databases for the ignored storage tests.
//!
//! `MUSE_PG_DSN` names a server with pgvector installed. Each [`TestDatabase`] creates a uniquely
//! named database there and drops it again when the test ends.

mod error;

pub use error::{Error, Result};

use std::{env, str::FromStr, thread};

use sqlx::{
	ConnectOptions, Connection, Executor,
	postgres::{PgConnectOptions, PgConnection},
};
use tokio::runtime::Builder;
use uuid::Uuid;

pub const DSN_ENV: &str = "MUSE_PG_DSN";

const MAINTENANCE_DATABASES: [&str; 2] = ["postgres", "template1"];

pub struct TestDatabase {
	name: String,
	options: PgConnectOptions,
	maintenance: PgConnectOptions,
	dropped: bool,
}
impl TestDatabase {
	/// `Ok(None)` when `MUSE_PG_DSN` is unset or blank.
	pub async fn from_env() -> Result<Option<Self>> {
		match env::var(DSN_ENV).ok().filter(|dsn| !dsn.trim().is_empty()) {
			Some(server_dsn) => Self::create(&server_dsn).await.map(Some),
			None => Ok(None),
		}
	}

	pub async fn create(server_dsn: &str) -> Result<Self> {
		let server = PgConnectOptions::from_str(server_dsn)
			.map_err(|err| Error::Message(format!("{DSN_ENV} is not a valid DSN: {err}.")))?;
		let (maintenance, mut conn) = open_maintenance(&server).await?;
		let name = format!("muse_test_{}", Uuid::new_v4().simple());

		conn.execute(format!(r#"CREATE DATABASE "{name}""#).as_str()).await?;

		Ok(Self { options: server.database(&name), name, maintenance, dropped: false })
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Storage config pointing at this database.
	pub fn postgres(&self) -> muse_config::Postgres {
		muse_config::Postgres { dsn: self.options.to_url_lossy().to_string(), pool_max_conns: 1 }
	}

	pub async fn drop_database(mut self) -> Result<()> {
		drop_database(&self.name, &self.maintenance).await?;

		self.dropped = true;

		Ok(())
	}
}
impl Drop for TestDatabase {
	fn drop(&mut self) {
		if self.dropped {
			return;
		}

		let name = self.name.clone();
		let maintenance = self.maintenance.clone();
		// A panicking test may drop us inside its runtime; block on a fresh one elsewhere.
		let handle = thread::spawn(move || {
			let result = Builder::new_current_thread()
				.enable_all()
				.build()
				.map_err(|err| Error::Message(format!("Failed to build cleanup runtime: {err}.")))
				.and_then(|runtime| runtime.block_on(drop_database(&name, &maintenance)));

			if let Err(err) = result {
				eprintln!("Test database {name} was not dropped: {err}");
			}
		});
		let _ = handle.join();
	}
}

async fn open_maintenance(server: &PgConnectOptions) -> Result<(PgConnectOptions, PgConnection)> {
	let mut last_err = None;

	for database in MAINTENANCE_DATABASES {
		let options = server.clone().database(database);

		match PgConnection::connect_with(&options).await {
			Ok(conn) => return Ok((options, conn)),
			Err(err) => last_err = Some(err),
		}
	}

	Err(Error::Message(format!("No maintenance database is reachable: {last_err:?}.")))
}

async fn drop_database(name: &str, maintenance: &PgConnectOptions) -> Result<()> {
	let mut conn = PgConnection::connect_with(maintenance).await?;

	conn.execute(format!(r#"DROP DATABASE IF EXISTS "{name}" WITH (FORCE)"#).as_str()).await?;

	Ok(())
}
