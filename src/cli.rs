// command line interface

use crate::core::{DEFAULT_MAX_INPUT_LEN, GuardConfig, Mode};
use crate::{Db, Error, Guard, Output, Server};
use clap::{Parser, Subcommand};
use miette::Result;
use std::io::Read;

#[derive(Parser)]
#[command(name = "sqlguard", about = "Check sql for mutations and injection before it runs")]
struct Cli {
    /// execution mode the guard enforces
    #[arg(long, short, value_enum, env = "SQLGUARD_MODE", default_value_t = Mode::ReadOnly, global = true)]
    mode: Mode,

    /// reject sql longer than this many bytes
    #[arg(long, env = "SQLGUARD_MAX_INPUT_LEN", default_value_t = DEFAULT_MAX_INPUT_LEN, global = true)]
    max_input_len: usize,

    /// print json instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// classify sql without running it (reads stdin when no sql given)
    Check { sql: Option<String> },

    /// run sql through the guard against a database
    Query {
        /// database connection url
        #[arg(long, short, env = "DATABASE_URL")]
        db: String,

        sql: String,
    },

    /// start as http server
    Serve {
        /// database connection url
        #[arg(long, short, env = "DATABASE_URL")]
        db: String,

        /// port number
        #[arg(long, short, default_value = "3000")]
        port: u16,

        /// host to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let guard = Guard::new(GuardConfig {
        mode: cli.mode,
        max_input_len: cli.max_input_len,
    });

    match cli.command {
        Commands::Check { sql } => {
            let sql = match sql {
                Some(sql) => sql,
                None => read_stdin()?,
            };
            Ok(check(&guard, &sql, cli.json)?)
        }

        Commands::Query { db, sql } => {
            let db = Db::connect(&db).await?;
            let result = db.run(&guard, &sql).await?;

            if cli.json {
                Output::raw(&result);
            } else {
                Output::pretty(&sql, &result);
            }
            Ok(())
        }

        Commands::Serve { db, port, host } => Ok(Server::run(&db, guard, &host, port).await?),
    }
}

// print the report, then fail if the guard would block it
fn check(guard: &Guard, sql: &str, json: bool) -> Result<(), Error> {
    let report = guard.inspect(sql)?;
    let blocked = guard.decide(&report);

    if json {
        Output::raw(&report);
    } else {
        Output::report(sql, &report, blocked.as_ref());
    }

    match blocked {
        Some(reason) => Err(Error::Blocked(reason)),
        None => Ok(()),
    }
}

fn read_stdin() -> Result<String, Error> {
    let mut sql = String::new();
    std::io::stdin().read_to_string(&mut sql)?;
    Ok(sql.trim().to_string())
}
