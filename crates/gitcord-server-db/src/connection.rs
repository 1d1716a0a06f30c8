// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqliteSynchronous};
use sqlx::ConnectOptions;

use crate::error::DbError;

const SQLITE_IOERR: i32 = 10;
const SQLITE_CANTOPEN: i32 = 14;

/// Parse a SQLite URL (`sqlite:./gitcord.db`) with WAL and foreign keys on.
pub fn connect_options(database_url: &str) -> Result<SqliteConnectOptions, DbError> {
	Ok(SqliteConnectOptions::from_str(database_url)
		.map_err(|e| DbError::Internal(format!("Invalid database URL: {e}")))?
		.journal_mode(SqliteJournalMode::Wal)
		.synchronous(SqliteSynchronous::Normal)
		.foreign_keys(true)
		.create_if_missing(true))
}

/// Open a connection and make sure the schema exists.
#[tracing::instrument(skip(options))]
pub async fn open_connection(options: &SqliteConnectOptions) -> Result<SqliteConnection, sqlx::Error> {
	let mut conn = options.connect().await?;
	apply_schema(&mut conn).await?;
	tracing::debug!("database connection opened");
	Ok(conn)
}

async fn apply_schema(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS accounts (
			name TEXT PRIMARY KEY NOT NULL,
			channel_id INTEGER NOT NULL,
			sync_options INTEGER NOT NULL,
			webhook_url TEXT
		)
		"#,
	)
	.execute(&mut *conn)
	.await?;

	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS repositories (
			account TEXT NOT NULL REFERENCES accounts(name),
			name TEXT NOT NULL,
			thread_id INTEGER NOT NULL,
			PRIMARY KEY (account, name)
		)
		"#,
	)
	.execute(&mut *conn)
	.await?;

	Ok(())
}

/// True for failures that mean the connection itself is unusable, as opposed
/// to a problem with the statement.
pub fn is_connection_error(err: &sqlx::Error) -> bool {
	match err {
		sqlx::Error::Io(_)
		| sqlx::Error::Tls(_)
		| sqlx::Error::Protocol(_)
		| sqlx::Error::WorkerCrashed
		| sqlx::Error::PoolClosed
		| sqlx::Error::PoolTimedOut => true,
		sqlx::Error::Database(db) => db
			.code()
			.and_then(|code| code.parse::<i32>().ok())
			.map(|code| code & 0xff)
			.is_some_and(|code| code == SQLITE_IOERR || code == SQLITE_CANTOPEN),
		_ => false,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejects_invalid_url() {
		assert!(matches!(
			connect_options("sqlite:./gitcord.db?mode=bogus"),
			Err(DbError::Internal(_))
		));
	}

	#[test]
	fn io_failures_are_connection_errors() {
		let io = sqlx::Error::Io(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone"));
		assert!(is_connection_error(&io));
		assert!(is_connection_error(&sqlx::Error::WorkerCrashed));
		assert!(!is_connection_error(&sqlx::Error::RowNotFound));
	}

	#[tokio::test]
	async fn schema_is_idempotent() {
		let options = connect_options("sqlite::memory:").unwrap();
		let mut conn = open_connection(&options).await.unwrap();
		apply_schema(&mut conn).await.unwrap();
	}

	#[tokio::test]
	async fn constraint_violations_are_not_connection_errors() {
		let options = connect_options("sqlite::memory:").unwrap();
		let mut conn = open_connection(&options).await.unwrap();

		let err = sqlx::query(
			"INSERT INTO repositories (account, name, thread_id) VALUES ('ghost', 'repo', 1)",
		)
		.execute(&mut conn)
		.await
		.unwrap_err();
		assert!(!is_connection_error(&err));
	}
}
