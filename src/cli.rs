use crate::{
    app::AppConfig,
    input::{parse_address, validate_rpc_url},
};
use clap::Parser;
use tracing::warn;

#[derive(Parser, Debug, Default)]
#[command(name = "safe-terminal")]
#[command(version)]
#[command(about = "Terminal front-end for Safe multisig wallets")]
pub struct Args {
    /// Safe address to open on start-up
    #[arg(long)]
    pub address: Option<String>,

    /// JSON-RPC endpoint to read chain data from
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Render without colors
    #[arg(long)]
    pub no_colors: bool,

    /// Write debug-level logs
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Start-up configuration. Invalid values are dropped so the user is
    /// prompted for them instead.
    pub fn config(&self) -> AppConfig {
        let address = self.address.as_deref().and_then(|value| {
            let parsed = parse_address(value.trim());
            if parsed.is_none() {
                warn!(%value, "ignoring invalid --address");
            }
            parsed
        });
        let rpc_url = self.rpc_url.as_deref().and_then(|value| match validate_rpc_url(value) {
            Ok(_) => Some(value.trim().to_string()),
            Err(err) => {
                warn!(%value, error = %err, "ignoring invalid --rpc-url");
                None
            }
        });
        AppConfig {
            address,
            rpc_url,
            no_colors: self.no_colors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_flags() {
        let args = Args::try_parse_from([
            "safe-terminal",
            "--address",
            "0x000000000000000000000000000000000000dEaD",
            "--rpc-url",
            "https://eth.example/v1",
            "--no-colors",
            "--debug",
        ])
        .unwrap();
        assert!(args.debug);

        let config = args.config();
        assert!(config.no_colors);
        assert_eq!(
            config.address,
            parse_address("0x000000000000000000000000000000000000dEaD")
        );
        assert_eq!(config.rpc_url.as_deref(), Some("https://eth.example/v1"));
    }

    #[test]
    fn invalid_values_are_ignored() {
        let args = Args::try_parse_from([
            "safe-terminal",
            "--address",
            "0x1234",
            "--rpc-url",
            "ftp://example.org",
        ])
        .unwrap();
        let config = args.config();
        assert_eq!(config.address, None);
        assert_eq!(config.rpc_url, None);
        assert!(!config.no_colors);
    }
}
