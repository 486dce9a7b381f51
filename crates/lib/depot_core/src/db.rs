//! Ephemeral PostgreSQL support for integration tests.
//!
//! Spawns a throwaway instance via `initdb`/`pg_ctl` discovered through
//! `pg_config` on PATH. Data lives in a tempdir and is cleaned up on drop.
//! Production deployments connect to an external server via `DATABASE_URL`;
//! this exists so the test suite needs no running infrastructure.

use std::net::TcpListener;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tokio::time::sleep;
use tracing::info;

/// Database name used by ephemeral instances.
const DATABASE_NAME: &str = "depot";

/// Maximum time to wait for PostgreSQL to become ready.
const PG_READY_TIMEOUT: Duration = Duration::from_secs(30);

/// Poll interval when waiting for PostgreSQL readiness.
const PG_READY_POLL: Duration = Duration::from_millis(200);

/// Errors from the ephemeral database lifecycle.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("PostgreSQL command failed: {0}")]
    Command(String),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pg_config not found on PATH")]
    PgConfigNotFound,

    #[error("PostgreSQL not ready after {0:?}")]
    ReadyTimeout(Duration),
}

/// An ephemeral PostgreSQL instance: tempdir-backed data, auto-assigned port.
pub struct EphemeralPg {
    bin_dir: PathBuf,
    data_dir: PathBuf,
    port: u16,
    started: bool,
    /// Holds the tempdir so it lives as long as the instance (dropped = cleaned up).
    _tempdir: tempfile::TempDir,
}

impl EphemeralPg {
    /// Whether the PostgreSQL toolchain is available on this machine.
    pub async fn available() -> bool {
        Command::new("pg_config")
            .arg("--bindir")
            .output()
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Create a new instance. Discovers PG binaries via `pg_config --bindir`.
    pub async fn new() -> Result<Self, DbError> {
        let output = Command::new("pg_config")
            .arg("--bindir")
            .output()
            .await
            .map_err(|_| DbError::PgConfigNotFound)?;
        if !output.status.success() {
            return Err(DbError::PgConfigNotFound);
        }
        let bin_dir = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());

        let tempdir = tempfile::tempdir()?;
        let data_dir = tempdir.path().join("pgdata");

        Ok(Self {
            bin_dir,
            data_dir,
            port: 0,
            started: false,
            _tempdir: tempdir,
        })
    }

    /// Initialize the data directory and start the server.
    pub async fn start(&mut self) -> Result<(), DbError> {
        let initdb = self.bin_dir.join("initdb");
        let output = Command::new(&initdb)
            .arg("-D")
            .arg(&self.data_dir)
            .arg("--no-locale")
            .arg("--encoding=UTF8")
            .output()
            .await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DbError::Command(format!("initdb failed: {stderr}")));
        }

        self.port = find_free_port()?;

        let pg_ctl = self.bin_dir.join("pg_ctl");
        let port_opt = format!(
            "-p {} -k {} -h localhost",
            self.port,
            self.data_dir.display()
        );
        let logfile = self.data_dir.join("postgresql.log");
        let output = Command::new(&pg_ctl)
            .arg("-D")
            .arg(&self.data_dir)
            .arg("-o")
            .arg(&port_opt)
            .arg("-l")
            .arg(&logfile)
            .arg("start")
            .output()
            .await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DbError::Command(format!("pg_ctl start failed: {stderr}")));
        }

        self.wait_for_ready().await?;
        self.started = true;
        self.create_database().await?;
        info!(port = self.port, "ephemeral PostgreSQL ready");
        Ok(())
    }

    /// Stop the server. Data is discarded when the instance drops.
    pub async fn stop(&mut self) -> Result<(), DbError> {
        if !self.started {
            return Ok(());
        }
        let pg_ctl = self.bin_dir.join("pg_ctl");
        let output = Command::new(&pg_ctl)
            .arg("-D")
            .arg(&self.data_dir)
            .arg("-m")
            .arg("fast")
            .arg("stop")
            .output()
            .await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DbError::Command(format!("pg_ctl stop failed: {stderr}")));
        }
        self.started = false;
        Ok(())
    }

    /// Connection URL for the application database.
    pub fn connection_url(&self) -> String {
        format!("postgresql://localhost:{}/{}", self.port, DATABASE_NAME)
    }

    async fn wait_for_ready(&self) -> Result<(), DbError> {
        let pg_isready = self.bin_dir.join("pg_isready");
        let deadline = tokio::time::Instant::now() + PG_READY_TIMEOUT;

        loop {
            let output = Command::new(&pg_isready)
                .arg("-p")
                .arg(self.port.to_string())
                .arg("-h")
                .arg("localhost")
                .output()
                .await?;
            if output.status.success() {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(DbError::ReadyTimeout(PG_READY_TIMEOUT));
            }
            sleep(PG_READY_POLL).await;
        }
    }

    async fn create_database(&self) -> Result<(), DbError> {
        let maintenance_url = format!("postgresql://localhost:{}/postgres", self.port);
        let pool = sqlx::PgPool::connect(&maintenance_url).await?;
        // CREATE DATABASE cannot use bind parameters
        sqlx::query(&format!("CREATE DATABASE \"{DATABASE_NAME}\""))
            .execute(&pool)
            .await?;
        pool.close().await;
        Ok(())
    }
}

/// Find a free ephemeral port by binding to port 0.
fn find_free_port() -> Result<u16, DbError> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lifecycle_start_stop() -> Result<(), DbError> {
        if !EphemeralPg::available().await {
            eprintln!("pg_config not on PATH; skipping");
            return Ok(());
        }

        let mut pg = EphemeralPg::new().await?;
        assert!(!pg.started);

        pg.start().await?;
        assert!(pg.started);
        assert_ne!(0, pg.port);

        let url = pg.connection_url();
        assert!(url.starts_with("postgresql://"));
        assert!(url.contains(DATABASE_NAME));

        pg.stop().await?;
        Ok(())
    }
}
