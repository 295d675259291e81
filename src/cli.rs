//! CLI argument parsing

use clap::{Parser, Subcommand};

/// Parse a string as a hex or decimal u8
fn parse_hex_u8(s: &str) -> Result<u8, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u8::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u8>().map_err(|e| format!("Invalid number: {}", e))
    }
}

#[derive(Parser)]
#[command(name = "ccdbg")]
#[command(author, version, about = "In-circuit debug tool for ChipCon-style targets", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// GPIO chip name or device path, or "dummy" for the emulated target
    #[arg(short = 'D', long = "dev", global = true, default_value = "gpiochip0")]
    pub device: String,

    /// RST line offset [default: 24]
    #[arg(short = 'r', long, global = true)]
    pub rst: Option<u32>,

    /// DC (debug clock) line offset [default: 27]
    #[arg(short = 'c', long, global = true)]
    pub dc: Option<u32>,

    /// DD (debug data) line offset [default: 28]
    #[arg(short = 'd', long, global = true)]
    pub dd: Option<u32>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read the 16-bit chip ID
    Id,

    /// Read the program counter
    Pc,

    /// Read the debug status byte
    Status,

    /// Halt the CPU, leaving the target in debug mode
    Halt,

    /// Resume execution
    Resume,

    /// Single-step one instruction
    Step,

    /// Read or write the debug configuration byte
    Config {
        /// New configuration value (hex or decimal); omit to read
        #[arg(value_parser = parse_hex_u8)]
        value: Option<u8>,
    },

    /// Execute an instruction on the target
    Exec {
        /// Opcode bytes, hex or decimal
        #[arg(value_parser = parse_hex_u8, num_args = 1..=3, required = true)]
        bytes: Vec<u8>,
    },

    /// Mass-erase flash, configuration and lock bits
    Erase,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_decimal() {
        assert_eq!(parse_hex_u8("0x22"), Ok(0x22));
        assert_eq!(parse_hex_u8("0XA5"), Ok(0xA5));
        assert_eq!(parse_hex_u8("34"), Ok(34));
        assert!(parse_hex_u8("0x100").is_err());
        assert!(parse_hex_u8("nope").is_err());
    }
}
