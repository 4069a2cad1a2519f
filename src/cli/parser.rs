//! Command line parser

use crate::error::CliError;
use crate::transport::UploadParams;

pub const USAGE: &str = "\
data-keeper <command>

Commands:
  put <id> [--hash <hex> --algorithm <name>] [--background]   store stdin under <id>
  get <id>                                                     write blob to stdout
  delete <id>                                                  delete blob
  exists <id>                                                  print true/false
  size <id>                                                    print size in bytes
  hash <id> <algorithm>                                        print digest
  help";

/// Commands accepted on the command line
#[derive(Debug, PartialEq)]
pub enum Command {
    Put(UploadParams),
    Get(String),
    Delete(String),
    Exists(String),
    Size(String),
    Hash { file_id: String, algorithm: String },
    Help,
}

/// Parse arguments (program name excluded) into a `Command`.
pub fn parse_args(args: &[String]) -> Result<Command, CliError> {
    let Some((cmd, rest)) = args.split_first() else {
        return Ok(Command::Help);
    };

    match cmd.to_ascii_lowercase().as_str() {
        "put" => parse_put(rest),
        "get" => Ok(Command::Get(single_id("get", rest)?)),
        "delete" | "del" | "rm" => Ok(Command::Delete(single_id("delete", rest)?)),
        "exists" => Ok(Command::Exists(single_id("exists", rest)?)),
        "size" => Ok(Command::Size(single_id("size", rest)?)),
        "hash" => match rest {
            [file_id, algorithm] => Ok(Command::Hash {
                file_id: file_id.clone(),
                algorithm: algorithm.clone(),
            }),
            _ => Err(usage("hash <id> <algorithm>")),
        },
        "help" | "-h" | "--help" => Ok(Command::Help),
        other => Err(CliError::Usage(format!("unknown command '{}'", other))),
    }
}

fn parse_put(args: &[String]) -> Result<Command, CliError> {
    let Some((file_id, flags)) = args.split_first() else {
        return Err(usage("put <id> [--hash <hex> --algorithm <name>] [--background]"));
    };

    let mut params = UploadParams::new(file_id.clone());
    let mut flags = flags.iter();

    while let Some(flag) = flags.next() {
        match flag.as_str() {
            "--hash" => params.hash = Some(flag_value(flag, flags.next())?),
            "--algorithm" => params.algorithm = Some(flag_value(flag, flags.next())?),
            "--background" => params.background = true,
            other => return Err(CliError::Usage(format!("unknown option '{}'", other))),
        }
    }

    Ok(Command::Put(params))
}

fn single_id(cmd: &str, args: &[String]) -> Result<String, CliError> {
    match args {
        [file_id] => Ok(file_id.clone()),
        _ => Err(usage(&format!("{} <id>", cmd))),
    }
}

fn flag_value(flag: &str, value: Option<&String>) -> Result<String, CliError> {
    value
        .cloned()
        .ok_or_else(|| CliError::Usage(format!("{} requires a value", flag)))
}

fn usage(expected: &str) -> CliError {
    CliError::Usage(format!("data-keeper {}", expected))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &str) -> Vec<String> {
        raw.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_parse_basic_commands() {
        assert_eq!(parse_args(&args("")).unwrap(), Command::Help);
        assert_eq!(parse_args(&args("help")).unwrap(), Command::Help);
        assert_eq!(
            parse_args(&args("get report.pdf")).unwrap(),
            Command::Get("report.pdf".to_string())
        );
        assert_eq!(
            parse_args(&args("DELETE report.pdf")).unwrap(),
            Command::Delete("report.pdf".to_string())
        );
        assert_eq!(
            parse_args(&args("size a/b.bin")).unwrap(),
            Command::Size("a/b.bin".to_string())
        );
        assert_eq!(
            parse_args(&args("hash a.bin sha256")).unwrap(),
            Command::Hash {
                file_id: "a.bin".to_string(),
                algorithm: "sha256".to_string()
            }
        );
    }

    #[test]
    fn test_parse_put_flags() {
        let command = parse_args(&args("put a.bin --hash abcd --algorithm sha256 --background"))
            .unwrap();
        let expected = UploadParams::new("a.bin").with_hash("abcd", "sha256").in_background();
        assert_eq!(command, Command::Put(expected));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_args(&args("get")), Err(CliError::Usage(_))));
        assert!(matches!(parse_args(&args("put")), Err(CliError::Usage(_))));
        assert!(matches!(
            parse_args(&args("put a.bin --hash")),
            Err(CliError::Usage(_))
        ));
        assert!(matches!(
            parse_args(&args("put a.bin --force")),
            Err(CliError::Usage(_))
        ));
        assert!(matches!(parse_args(&args("list")), Err(CliError::Usage(_))));
    }
}
