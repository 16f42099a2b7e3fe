use clap::{Parser, ValueEnum};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(author, version, about = "Ergo box and transaction codec")]
pub struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: Level,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Parser, Debug)]
pub enum Command {
    /// Decode a box in canonical form
    DecodeBox {
        /// Hex encoded box bytes
        hex: String,
    },
    /// Decode a transaction
    DecodeTx {
        /// Hex encoded transaction bytes
        hex: String,

        /// Decode as an unsigned transaction (empty proofs)
        #[arg(long)]
        unsigned: bool,
    },
    /// Decode a reduced transaction
    DecodeReduced {
        /// Hex encoded reduced transaction bytes
        hex: String,
    },
    /// Print the id of a box in canonical form
    BoxId {
        /// Hex encoded box bytes
        hex: String,
    },
    /// Decode and re-encode, reporting whether the bytes are unchanged
    Roundtrip {
        /// What the bytes encode
        #[arg(value_enum)]
        kind: RecordKind,

        /// Hex encoded bytes
        hex: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordKind {
    Box,
    Tx,
    UnsignedTx,
    Reduced,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip_command() {
        let args = Args::try_parse_from(["ergo-box-codec", "roundtrip", "unsigned-tx", "00000000"]).unwrap();
        match args.command {
            Command::Roundtrip { kind, hex } => {
                assert_eq!(kind, RecordKind::UnsignedTx);
                assert_eq!(hex, "00000000");
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(args.log_level, Level::INFO);
    }

    #[test]
    fn test_global_log_level() {
        let args =
            Args::try_parse_from(["ergo-box-codec", "decode-tx", "--unsigned", "00", "--log-level", "debug"])
                .unwrap();
        assert_eq!(args.log_level, Level::DEBUG);
        assert!(matches!(args.command, Command::DecodeTx { unsigned: true, .. }));
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let result = Args::try_parse_from(["ergo-box-codec", "--log-level", "verbose", "box-id", "00"]);
        assert!(result.is_err());
    }
}
