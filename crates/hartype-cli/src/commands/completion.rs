use anyhow::Result;
use clap::Command;
use clap_complete::{Shell, generate};
use std::io::{self, Write};

/// Print a completion script for `shell` to stdout
pub fn execute(shell: Shell, cmd: &mut Command) -> Result<()> {
    let mut stdout = io::stdout();
    write_script(shell, cmd, &mut stdout)?;
    stdout.flush()?;
    Ok(())
}

/// Render the completion script for `cmd` into `out`
pub fn write_script<W: Write>(shell: Shell, cmd: &mut Command, out: &mut W) -> Result<()> {
    let bin_name = cmd
        .get_bin_name()
        .unwrap_or_else(|| cmd.get_name())
        .to_string();
    tracing::debug!("Generating {} completions for {}", shell, bin_name);
    generate(shell, cmd, bin_name, out);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Arg;

    fn command() -> Command {
        Command::new("hartype").subcommand(
            Command::new("format").arg(Arg::new("file").required(true)),
        )
    }

    #[test]
    fn test_bash_script_names_binary_and_subcommands() {
        let mut out = Vec::new();
        write_script(Shell::Bash, &mut command(), &mut out).unwrap();
        let script = String::from_utf8(out).unwrap();

        assert!(script.contains("hartype"));
        assert!(script.contains("format"));
    }

    #[test]
    fn test_zsh_script_is_compdef() {
        let mut out = Vec::new();
        write_script(Shell::Zsh, &mut command(), &mut out).unwrap();
        let script = String::from_utf8(out).unwrap();

        assert!(script.starts_with("#compdef hartype"));
    }
}
