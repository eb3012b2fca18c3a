use clap::Parser;

pub const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017/plantsDatabase";

#[derive(Parser, Debug)]
#[command(name = "my-arbolitos-web")]
#[command(about = "Web app para llevar registro de mis plantas y sus cosechas")]
pub struct Cli {
    /// MongoDB connection string; the path selects the database
    #[arg(long = "mongodb-uri", env = "MONGODB_URI", default_value = DEFAULT_MONGODB_URI)]
    pub mongodb_uri: String,

    /// Address to listen on
    #[arg(long, env = "ARBOLITOS_BIND", default_value = "127.0.0.1:5000")]
    pub bind: String,

    /// Keep records in memory instead of MongoDB (lost on exit)
    #[arg(long, env = "ARBOLITOS_MEMORY_STORE")]
    pub memory: bool,

    /// Emit logs as JSON lines
    #[arg(long = "log-json", env = "ARBOLITOS_LOG_JSON")]
    pub log_json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "my-arbolitos-web",
            "--mongodb-uri",
            "mongodb://db:27017/garden",
            "--bind",
            "0.0.0.0:8080",
            "--memory",
        ])
        .unwrap();
        assert_eq!(cli.mongodb_uri, "mongodb://db:27017/garden");
        assert_eq!(cli.bind, "0.0.0.0:8080");
        assert!(cli.memory);
        assert!(!cli.log_json);
    }

    #[test]
    fn command_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
