mod cli;

use clap::Parser;
use cli::{Args, Command, RecordKind};
use ergo_box_codec::{ErgoBox, ReducedTransaction, SignedTransaction, UnsignedTransaction};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::FmtSubscriber;

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RoundtripReport {
    kind: String,
    identical: bool,
    input_len: usize,
    output_len: usize,
    reencoded: String,
}

fn roundtrip(kind: RecordKind, hex_str: &str) -> Result<RoundtripReport, Box<dyn std::error::Error>> {
    let input = hex::decode(hex_str.trim())?;
    let output = match kind {
        RecordKind::Box => ErgoBox::from_bytes(&input)?.to_bytes()?,
        RecordKind::Tx => SignedTransaction::from_bytes(&input)?.to_bytes()?,
        RecordKind::UnsignedTx => UnsignedTransaction::from_bytes(&input)?.to_bytes()?,
        RecordKind::Reduced => ReducedTransaction::from_bytes(&input)?.to_bytes()?,
    };
    Ok(RoundtripReport {
        kind: format!("{:?}", kind),
        identical: input == output,
        input_len: input.len(),
        output_len: output.len(),
        reencoded: hex::encode(&output),
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::DecodeBox { hex } => print_json(&ErgoBox::from_hex(&hex)?)?,
        Command::DecodeTx { hex, unsigned } => {
            if unsigned {
                print_json(&UnsignedTransaction::from_hex(&hex)?)?
            } else {
                print_json(&SignedTransaction::from_hex(&hex)?)?
            }
        }
        Command::DecodeReduced { hex } => print_json(&ReducedTransaction::from_hex(&hex)?)?,
        Command::BoxId { hex } => println!("{}", ErgoBox::from_hex(&hex)?.box_id()),
        Command::Roundtrip { kind, hex } => {
            let report = roundtrip(kind, &hex)?;
            debug!(identical = report.identical, len = report.input_len, "Roundtrip finished");
            print_json(&report)?;
            if !report.identical {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
