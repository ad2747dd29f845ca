//! Line commands understood by the interactive form.

use std::path::PathBuf;

use selector_core::fields::{parse_number, FieldName, PreferenceKey};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Show,
    /// Raw text for a field; empty text clears an optional field
    Set { field: FieldName, text: String },
    Pref { key: PreferenceKey, value: f64 },
    Commit(FieldName),
    Check,
    Submit,
    Result,
    Materials,
    Reset,
    Save(PathBuf),
    Load(PathBuf),
    Json,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  show                     current fields and diagnostics
  set <field> [text]       edit a field (no text clears an optional field)
  pref <name> <0..1>       set a preference weight
  commit <field>           clamp a field to its input bounds
  check                    list diagnostics
  submit                   send the form to the selection service
  result                   show the last result
  materials                reload the material list
  reset                    restore defaults
  save <path> / load <path>
  json                     print the last result as JSON
  help / quit";

/// Parse one input line. Blank lines give `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((v, r)) => (v, r.trim()),
        None => (line, ""),
    };

    let field = |name: &str| FieldName::from_str_flexible(name).map_err(|e| e.to_string());
    let path = |arg: &str| {
        if arg.is_empty() {
            Err(format!("usage: {} <path>", verb))
        } else {
            Ok(PathBuf::from(arg))
        }
    };

    let command = match verb.to_lowercase().as_str() {
        "show" | "s" => Command::Show,
        "set" => {
            let (name, text) = match rest.split_once(char::is_whitespace) {
                Some((n, t)) => (n, t.trim()),
                None => (rest, ""),
            };
            if name.is_empty() {
                return Err("usage: set <field> [text]".to_string());
            }
            Command::Set {
                field: field(name)?,
                text: text.to_string(),
            }
        }
        "pref" => {
            let (name, value) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| "usage: pref <name> <value>".to_string())?;
            let key = PreferenceKey::from_str_flexible(name).map_err(|e| e.to_string())?;
            let value = parse_number(value).ok_or_else(|| format!("not a number: {}", value.trim()))?;
            Command::Pref { key, value }
        }
        "commit" => Command::Commit(field(rest)?),
        "check" => Command::Check,
        "submit" | "calc" => Command::Submit,
        "result" => Command::Result,
        "materials" => Command::Materials,
        "reset" => Command::Reset,
        "save" => Command::Save(path(rest)?),
        "load" => Command::Load(path(rest)?),
        "json" => Command::Json,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command '{}', try 'help'", other)),
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_line() {
        assert_eq!(parse_command("   "), Ok(None));
    }

    #[test]
    fn test_set_with_text() {
        let cmd = parse_command("set shaft-diameter 45.5").unwrap();
        assert_eq!(
            cmd,
            Some(Command::Set {
                field: FieldName::ShaftDiameter,
                text: "45.5".to_string()
            })
        );
    }

    #[test]
    fn test_set_keeps_spaces_in_text() {
        let cmd = parse_command("set hub_material Steel S355").unwrap();
        assert_eq!(
            cmd,
            Some(Command::Set {
                field: FieldName::HubMaterial,
                text: "Steel S355".to_string()
            })
        );
    }

    #[test]
    fn test_set_without_text_clears() {
        let cmd = parse_command("set mu_override").unwrap();
        assert_eq!(
            cmd,
            Some(Command::Set {
                field: FieldName::MuOverride,
                text: String::new()
            })
        );
    }

    #[test]
    fn test_pref() {
        let cmd = parse_command("pref ease 0.8").unwrap();
        assert_eq!(
            cmd,
            Some(Command::Pref {
                key: PreferenceKey::Ease,
                value: 0.8
            })
        );
        assert!(parse_command("pref ease lots").is_err());
        assert!(parse_command("pref ease").is_err());
    }

    #[test]
    fn test_unknown_field_and_verb() {
        assert!(parse_command("set wheel_size 3").unwrap_err().contains("wheel_size"));
        assert!(parse_command("frobnicate").unwrap_err().contains("help"));
    }

    #[test]
    fn test_paths_required() {
        assert!(parse_command("save").is_err());
        assert_eq!(
            parse_command("load form.json").unwrap(),
            Some(Command::Load(PathBuf::from("form.json")))
        );
    }
}
