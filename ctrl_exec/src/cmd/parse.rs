//! Operator input tokenizer

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::{
    CmdParseError, OpCmd, CALIBRATION_COMMAND, HELP_COMMAND, PAUSE_COMMAND, REFERENCE_COMMAND,
    STOP_COMMAND,
};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Split an operator line into whitespace-separated tokens and parse each
/// one.
///
/// Every token yields either a command or a parse error; the console echoes
/// the errors and executes the commands, so one bad token never swallows
/// the rest of the line.
pub fn parse_line(line: &str) -> Vec<Result<OpCmd, CmdParseError>> {
    line.split_whitespace().map(parse_token).collect()
}

/// Parse a single `--name` / `--name=value` token.
pub fn parse_token(token: &str) -> Result<OpCmd, CmdParseError> {
    let option = match token.strip_prefix("--") {
        Some(o) => o,
        None => return Err(CmdParseError::NotAnOption(token.to_string())),
    };

    let (name, value) = match option.find('=') {
        Some(pos) => (&option[..pos], Some(&option[pos + 1..])),
        None => (option, None),
    };

    match name {
        HELP_COMMAND => Ok(OpCmd::Help),
        STOP_COMMAND => Ok(OpCmd::Stop),
        PAUSE_COMMAND => Ok(OpCmd::TogglePause),
        REFERENCE_COMMAND => {
            let value = match value {
                Some(v) => v,
                None => return Err(CmdParseError::MissingValue(name.to_string())),
            };
            match value.parse::<f64>() {
                Ok(mm) => Ok(OpCmd::SetReference(mm)),
                Err(_) => Err(CmdParseError::InvalidValue {
                    name: name.to_string(),
                    value: value.to_string(),
                }),
            }
        }
        CALIBRATION_COMMAND => {
            let value = match value {
                Some(v) => v,
                None => return Err(CmdParseError::MissingValue(name.to_string())),
            };
            let values = parse_braced_vector(name, value)?;
            if values.len() != 2 {
                return Err(CmdParseError::WrongElementCount {
                    name: name.to_string(),
                    expected: 2,
                    found: values.len(),
                });
            }
            Ok(OpCmd::SetCalibration {
                m: values[0],
                q: values[1],
            })
        }
        _ => Err(CmdParseError::UnknownCommand(name.to_string())),
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Parse a braced value list like `{1.0,0.5}` into floats.
///
/// The braces are optional; values must not contain whitespace since the
/// line is tokenized on it first.
fn parse_braced_vector(name: &str, value: &str) -> Result<Vec<f64>, CmdParseError> {
    let inner = value
        .trim()
        .trim_start_matches('{')
        .trim_end_matches('}');

    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    inner
        .split(',')
        .map(|elem| {
            elem.trim().parse::<f64>().map_err(|_| CmdParseError::InvalidValue {
                name: name.to_string(),
                value: value.to_string(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reference_command_parses() {
        assert_eq!(parse_token("--rif=40"), Ok(OpCmd::SetReference(40.0)));
        assert_eq!(parse_token("--rif=-25.5"), Ok(OpCmd::SetReference(-25.5)));
    }

    #[test]
    fn flag_commands_parse() {
        assert_eq!(parse_token("--pause"), Ok(OpCmd::TogglePause));
        assert_eq!(parse_token("--stop"), Ok(OpCmd::Stop));
        assert_eq!(parse_token("--help"), Ok(OpCmd::Help));
    }

    #[test]
    fn calibration_command_parses() {
        assert_eq!(
            parse_token("--cal={1.5,0.5}"),
            Ok(OpCmd::SetCalibration { m: 1.5, q: 0.5 })
        );
        assert_eq!(
            parse_token("--cal=2,0"),
            Ok(OpCmd::SetCalibration { m: 2.0, q: 0.0 })
        );
    }

    #[test]
    fn calibration_element_count_is_enforced() {
        match parse_token("--cal={1.0}") {
            Err(CmdParseError::WrongElementCount {
                expected, found, ..
            }) => {
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("Expected WrongElementCount, got {:?}", other),
        }

        match parse_token("--cal={}") {
            Err(CmdParseError::WrongElementCount { found, .. }) => assert_eq!(found, 0),
            other => panic!("Expected WrongElementCount, got {:?}", other),
        }

        match parse_token("--cal={1,2,3}") {
            Err(CmdParseError::WrongElementCount { found, .. }) => assert_eq!(found, 3),
            other => panic!("Expected WrongElementCount, got {:?}", other),
        }
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        assert!(matches!(
            parse_token("rif=40"),
            Err(CmdParseError::NotAnOption(_))
        ));
        assert!(matches!(
            parse_token("--speed=3"),
            Err(CmdParseError::UnknownCommand(_))
        ));
        assert!(matches!(
            parse_token("--rif=fast"),
            Err(CmdParseError::InvalidValue { .. })
        ));
        assert!(matches!(
            parse_token("--rif"),
            Err(CmdParseError::MissingValue(_))
        ));
        assert!(matches!(
            parse_token("--cal={a,b}"),
            Err(CmdParseError::InvalidValue { .. })
        ));
    }

    #[test]
    fn lines_parse_token_by_token() {
        let parsed = parse_line("--rif=40 junk --pause");
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0], Ok(OpCmd::SetReference(40.0)));
        assert!(parsed[1].is_err());
        assert_eq!(parsed[2], Ok(OpCmd::TogglePause));
    }
}
