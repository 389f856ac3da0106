use std::env;
extern crate clap;
mod params_parser;

fn main() {
    memclt::run(env::args().collect())
}

mod memclt {
    use crate::params_parser::{Command, Engine, MemcacheClientConfig};
    use env_logger::Builder;
    use log::{debug, error, info};
    use memcadapter::{
        AdapterConfig, CacheAdapter, CacheCapability, ConnectionRegistry, MemcacheConnector,
        MemoryConnector,
    };
    use std::{io::Write, process};

    use super::params_parser;

    fn get_log_level(verbose: u8) -> log::LevelFilter {
        // Vary the output based on how many times the user used the "verbose" flag
        // // (i.e. 'myprog -v -v -v' or 'myprog -vvv' vs 'myprog -v'
        match verbose {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Warn,
            2 => log::LevelFilter::Info,
            3 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }

    pub fn init_logger(cli_config: &MemcacheClientConfig) {
        let mut builder = Builder::new();
        builder.filter_level(get_log_level(cli_config.verbose));
        builder.format_module_path(false);
        builder.format_file(false);
        builder.format_source_path(false);
        builder.format_target(false);

        builder.format(|buf, record| {
            let style = buf.default_level_style(record.level());
            writeln!(
                buf,
                "[{}] {style}{:<5}{style:#}: {}",
                buf.timestamp(),
                record.level(),
                record.args()
            )
        });
        builder.init();
    }

    fn connect(engine: Engine, config: AdapterConfig) -> Result<CacheAdapter, String> {
        let registry = ConnectionRegistry::new();
        let result = match engine {
            Engine::Memcache => CacheAdapter::init(config, &registry, &MemcacheConnector),
            Engine::Memory => CacheAdapter::init(config, &registry, &MemoryConnector::default()),
        };
        result.map_err(|err| err.to_string())
    }

    fn execute(adapter: &CacheAdapter, command: &Command) -> Result<String, String> {
        match command {
            Command::Set { key, value } => {
                let stored = match value.parse::<i64>() {
                    Ok(number) => adapter.write(key, &number),
                    Err(_) => adapter.write(key, value.as_str()),
                };
                if !stored {
                    return Err(format!("NOT_STORED {key}"));
                }
                info!(
                    "Stored {} under {}{}",
                    byte_unit::Byte::from_u64(value.len() as u64)
                        .get_appropriate_unit(byte_unit::UnitType::Decimal),
                    adapter.config().prefix,
                    key
                );
                Ok(String::from("STORED"))
            }
            // strings first: a bincode string would also decode as an integer
            Command::Get { key } => adapter
                .read::<String>(key)
                .or_else(|| adapter.read::<i64>(key).map(|number| number.to_string()))
                .ok_or_else(|| format!("NOT_FOUND {key}")),
            Command::Incr { key, offset } => adapter
                .increment(key, *offset)
                .map(|value| value.to_string())
                .ok_or_else(|| format!("NOT_FOUND {key}")),
            Command::Decr { key, offset } => adapter
                .decrement(key, *offset)
                .map(|value| value.to_string())
                .ok_or_else(|| format!("NOT_FOUND {key}")),
            Command::Delete { key } => match adapter.delete(key) {
                true => Ok(String::from("DELETED")),
                false => Err(format!("NOT_FOUND {key}")),
            },
            Command::Capabilities => {
                let capabilities = adapter.capabilities();
                let mut lines: Vec<String> = capabilities
                    .supported()
                    .map(|operation| format!("{operation}: supported"))
                    .collect();
                lines.extend(
                    capabilities
                        .unsupported()
                        .map(|operation| format!("{operation}: unsupported")),
                );
                Ok(lines.join("\n"))
            }
        }
    }

    pub fn run(args: Vec<String>) {
        let cli_config = match params_parser::parse(args) {
            Ok(config) => config,
            Err(err) => {
                eprint!("{}", err);
                process::exit(1);
            }
        };

        init_logger(&cli_config);

        let adapter_config = match cli_config.adapter_config() {
            Ok(config) => config,
            Err(err) => {
                error!("{}", err);
                process::exit(1);
            }
        };

        info!("Engine: {}", cli_config.engine.as_str());
        info!("Servers: {}", adapter_config.server_list().join(", "));
        info!("Prefix: {}", adapter_config.prefix);
        info!("Serialize: {}", adapter_config.serialize.as_str());
        debug!("Duration: {}s", adapter_config.duration);

        let adapter = match connect(cli_config.engine, adapter_config) {
            Ok(adapter) => adapter,
            Err(err) => {
                error!("{}", err);
                process::exit(1);
            }
        };

        match execute(&adapter, &cli_config.command) {
            Ok(output) => println!("{}", output),
            Err(err) => {
                println!("{}", err);
                process::exit(2);
            }
        }
    }

}
