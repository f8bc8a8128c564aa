//! [`Connection`]/[`Transaction`] for the blocking `postgres` client.

use std::io::{self, Read};

use postgres::{Client, NoTls};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::error::DatabaseResult;

use super::{Connection, Transaction};

/// Open the single connection used for the run.
pub fn connect(config: &DatabaseConfig) -> DatabaseResult<Client> {
    let client = postgres::Config::from(config).connect(NoTls)?;
    info!(host = %config.host, port = config.port, dbname = %config.dbname, "connected to database");
    Ok(client)
}

impl From<&DatabaseConfig> for postgres::Config {
    fn from(c: &DatabaseConfig) -> Self {
        let mut pg = postgres::Config::new();
        pg.host(&c.host).port(c.port).dbname(&c.dbname).user(&c.user);
        if let Some(password) = &c.password {
            pg.password(password);
        }
        pg
    }
}

impl Connection for Client {
    fn begin(&mut self) -> DatabaseResult<Box<dyn Transaction + '_>> {
        Ok(Box::new(self.transaction()?))
    }
}

impl Transaction for postgres::Transaction<'_> {
    fn execute(&mut self, statement: &str) -> DatabaseResult<()> {
        self.batch_execute(statement)?;
        Ok(())
    }

    fn copy_in(&mut self, statement: &str, source: &mut dyn Read) -> DatabaseResult<u64> {
        let mut writer = postgres::Transaction::copy_in(self, statement)?;
        io::copy(source, &mut writer)?;
        Ok(writer.finish()?)
    }

    fn commit(self: Box<Self>) -> DatabaseResult<()> {
        postgres::Transaction::commit(*self)?;
        Ok(())
    }

    fn rollback(self: Box<Self>) -> DatabaseResult<()> {
        postgres::Transaction::rollback(*self)?;
        Ok(())
    }
}
