use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::api::ApiOptions;
use crate::sheet::{ExportKind, ImportKind};
use crate::store::StoreOptions;

const DB_FILE_NAME: &str = "database.sqlite";

#[derive(Parser, Debug)]
#[command(author, version, about = "Library circulation backend")]
pub struct Cli {
    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub serve: ServeArgs,

    /// Also append log output to this file.
    #[arg(long, global = true)]
    pub log: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Load a spreadsheet into the store.
    Import {
        #[arg(value_enum)]
        kind: ImportKind,
        file: PathBuf,
    },
    /// Write one entity to an `.xlsx` file.
    Export {
        #[arg(value_enum)]
        kind: ExportKind,
        file: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// SQLite database file.
    #[arg(long, global = true, env = "CIRCULATION_DATABASE")]
    pub database: Option<PathBuf>,

    /// Directory the database lives in when `--database` is not given.
    #[arg(long, global = true, env = "USER_DATA_PATH", hide_env_values = true)]
    pub user_data_path: Option<PathBuf>,

    #[arg(long, global = true, default_value_t = 8)]
    pub pool_size: u32,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, global = true, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    #[arg(long, global = true, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,

    /// Built UI bundle to serve for non-API routes.
    #[arg(long, global = true, default_value = "build")]
    pub static_dir: PathBuf,

    #[arg(long, global = true, default_value_t = 20 * 1024 * 1024)]
    pub max_upload_bytes: usize,
}

impl StoreArgs {
    /// Database location: explicit path, else `<user data>/database.sqlite`, else `./database.sqlite`.
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        match (&self.database, &self.user_data_path) {
            (Some(path), _) => path.clone(),
            (None, Some(dir)) => dir.join(DB_FILE_NAME),
            (None, None) => PathBuf::from(DB_FILE_NAME),
        }
    }

    #[must_use]
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions::builder(self.db_path())
            .pool_size(self.pool_size)
            .finish()
    }
}

impl ServeArgs {
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    #[must_use]
    pub fn api_options(&self) -> ApiOptions {
        ApiOptions {
            static_dir: Some(self.static_dir.clone()),
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_args(database: Option<&str>, user_data_path: Option<&str>) -> StoreArgs {
        StoreArgs {
            database: database.map(PathBuf::from),
            user_data_path: user_data_path.map(PathBuf::from),
            pool_size: 8,
        }
    }

    #[test]
    fn explicit_database_wins() {
        let args = store_args(Some("/tmp/lib.sqlite"), Some("/data"));
        assert_eq!(args.db_path(), PathBuf::from("/tmp/lib.sqlite"));
    }

    #[test]
    fn user_data_path_holds_default_file() {
        let args = store_args(None, Some("/data"));
        assert_eq!(args.db_path(), PathBuf::from("/data/database.sqlite"));
        assert_eq!(store_args(None, None).db_path(), PathBuf::from("database.sqlite"));
    }

    #[test]
    fn parses_import_subcommand() {
        let cli = Cli::try_parse_from([
            "circulation",
            "--database",
            "lib.sqlite",
            "import",
            "books",
            "books.xlsx",
        ])
        .unwrap();
        assert_eq!(cli.store.db_path(), PathBuf::from("lib.sqlite"));
        assert!(matches!(
            cli.command,
            Some(Command::Import { kind: ImportKind::Books, .. })
        ));
    }

    #[test]
    fn serve_flags_go_before_or_after_subcommand() {
        let cli = Cli::try_parse_from(["circulation", "--port", "3000", "serve"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Serve)));
        assert_eq!(cli.serve.addr().port(), 3000);
        assert_eq!(cli.serve.static_dir, PathBuf::from("build"));

        let cli = Cli::try_parse_from([
            "circulation",
            "serve",
            "--port",
            "4000",
            "--static-dir",
            "dist",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Command::Serve)));
        assert_eq!(cli.serve.addr().port(), 4000);
        assert_eq!(cli.serve.static_dir, PathBuf::from("dist"));
    }
}
