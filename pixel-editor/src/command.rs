use anyhow::{Context, Result, bail};
use std::{path::PathBuf, str::FromStr};

/// One editor operation, as issued by a front end or a script line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Load(PathBuf),
    /// A missing side is derived from the aspect ratio when locking is on
    Resize {
        width: Option<u32>,
        height: Option<u32>,
    },
    /// Falls back to the configured tolerance
    RemoveBackground(Option<u8>),
    RestoreBackground,
    /// Falls back to the configured output directory
    Export(Option<PathBuf>),
    Reset,
    Tolerance(u8),
    Quality(u8),
    Aspect(bool),
    Transparency(bool),
    Info,
}

impl Command {
    /// Parse a script line. Blank lines and `#` comments yield `None`.
    pub fn parse_line(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        line.parse().map(Some)
    }
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut tokens = s.split_whitespace();
        let Some(name) = tokens.next() else {
            bail!("empty command");
        };
        let args = tokens.collect::<Vec<_>>();

        let command = match (name.to_lowercase().as_str(), args.as_slice()) {
            ("load" | "open", [path]) => Command::Load(PathBuf::from(*path)),
            ("resize", [width]) => Command::Resize {
                width: parse_side(width)?,
                height: None,
            },
            ("resize", [width, height]) => Command::Resize {
                width: parse_side(width)?,
                height: parse_side(height)?,
            },
            ("remove-background" | "remove", []) => Command::RemoveBackground(None),
            ("remove-background" | "remove", [tolerance]) => {
                Command::RemoveBackground(Some(parse_percent(tolerance)?))
            }
            ("restore-background" | "restore", []) => Command::RestoreBackground,
            ("export" | "save", []) => Command::Export(None),
            ("export" | "save", [dir]) => Command::Export(Some(PathBuf::from(*dir))),
            ("reset", []) => Command::Reset,
            ("tolerance", [value]) => Command::Tolerance(parse_percent(value)?),
            ("quality", [value]) => Command::Quality(parse_percent(value)?),
            ("aspect", [value]) => Command::Aspect(parse_switch(value)?),
            ("transparency", [value]) => Command::Transparency(parse_switch(value)?),
            ("info", []) => Command::Info,
            (name, args) => bail!("unknown command or wrong arguments: {name} {}", args.join(" ")),
        };

        Ok(command)
    }
}

// `auto` or `_` leaves the side to the aspect ratio
fn parse_side(token: &str) -> Result<Option<u32>> {
    if token == "auto" || token == "_" {
        return Ok(None);
    }

    token
        .parse::<u32>()
        .map(Some)
        .with_context(|| format!("invalid dimension: {token}"))
}

fn parse_percent(token: &str) -> Result<u8> {
    let value = token
        .trim_end_matches('%')
        .parse::<u8>()
        .with_context(|| format!("invalid percentage: {token}"))?;

    if value > 100 {
        bail!("percentage out of range: {value}");
    }

    Ok(value)
}

fn parse_switch(token: &str) -> Result<bool> {
    match token.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => bail!("expected on/off, got {token}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() -> Result<()> {
        assert_eq!("load a.png".parse::<Command>()?, Command::Load("a.png".into()));
        assert_eq!(
            "resize 100 50".parse::<Command>()?,
            Command::Resize {
                width: Some(100),
                height: Some(50)
            }
        );
        assert_eq!(
            "resize 100".parse::<Command>()?,
            Command::Resize {
                width: Some(100),
                height: None
            }
        );
        assert_eq!(
            "resize auto 80".parse::<Command>()?,
            Command::Resize {
                width: None,
                height: Some(80)
            }
        );
        assert_eq!("remove-background".parse::<Command>()?, Command::RemoveBackground(None));
        assert_eq!("remove 45".parse::<Command>()?, Command::RemoveBackground(Some(45)));
        assert_eq!("restore".parse::<Command>()?, Command::RestoreBackground);
        assert_eq!("export out".parse::<Command>()?, Command::Export(Some("out".into())));
        assert_eq!("EXPORT".parse::<Command>()?, Command::Export(None));
        assert_eq!("reset".parse::<Command>()?, Command::Reset);
        assert_eq!("tolerance 0".parse::<Command>()?, Command::Tolerance(0));
        assert_eq!("quality 75%".parse::<Command>()?, Command::Quality(75));
        assert_eq!("aspect on".parse::<Command>()?, Command::Aspect(true));
        assert_eq!("transparency off".parse::<Command>()?, Command::Transparency(false));
        assert_eq!("info".parse::<Command>()?, Command::Info);
        Ok(())
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        for line in [
            "",
            "frobnicate",
            "load",
            "load a b",
            "resize",
            "resize -3 4",
            "resize ten 4",
            "tolerance 101",
            "quality 300",
            "aspect maybe",
            "reset now",
        ] {
            assert!(line.parse::<Command>().is_err(), "{line}");
        }
    }

    #[test]
    fn test_parse_line_skips_comments() -> Result<()> {
        assert_eq!(Command::parse_line("   ")?, None);
        assert_eq!(Command::parse_line("# resize 1 1")?, None);
        assert_eq!(Command::parse_line("  reset  ")?, Some(Command::Reset));
        Ok(())
    }
}
