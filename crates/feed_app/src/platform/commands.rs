use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use super::config::DEFAULT_CONFIG_FILE;

/// What the process was asked to do on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Invocation {
    Run { config: PathBuf },
    Help,
    Version,
}

pub(crate) const USAGE: &str = "usage: feed_app [--config <file.ron>] [--help] [--version]";

pub(crate) fn parse_args<I>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = String>,
{
    let mut config = PathBuf::from(DEFAULT_CONFIG_FILE);
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Invocation::Help),
            "-V" | "--version" => return Ok(Invocation::Version),
            "-c" | "--config" => {
                let value = args.next().context("--config needs a file path")?;
                config = PathBuf::from(value);
            }
            other => {
                if let Some(value) = other.strip_prefix("--config=") {
                    config = PathBuf::from(value);
                } else {
                    bail!("unexpected argument {other:?}\n{USAGE}");
                }
            }
        }
    }
    Ok(Invocation::Run { config })
}

/// A line typed on stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    /// `open <category|-> [order] [viewer]`
    Open {
        category: Option<String>,
        order: Option<String>,
        viewer: Option<String>,
    },
    /// `more [author/permlink]`; without an anchor the last loaded post is used.
    More { anchor: Option<String> },
    /// `viewport <height>`
    Viewport(u32),
    /// `list`
    List,
    /// `status`
    Status,
    /// `help`
    Help,
    /// `quit`
    Quit,
}

pub(crate) const HELP: &str = "commands:
  open <category|-> [order] [viewer]   navigate (use `open feed @alice alice` for a feed)
  more [author/permlink]               load the page after the anchor (default: last post)
  viewport <height>                    set the reported viewport height
  list                                 print loaded posts
  status                               print fetch status per listing
  quit";

pub(crate) fn parse_command(line: &str) -> Result<Option<Command>> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let command = match head {
        "open" | "o" => {
            let Some(category) = rest.first() else {
                bail!("open needs a category (`-` for none)");
            };
            if rest.len() > 3 {
                bail!("open takes at most three arguments");
            }
            Command::Open {
                category: (*category != "-").then(|| category.to_string()),
                order: rest.get(1).map(|s| s.to_string()),
                viewer: rest.get(2).map(|s| s.to_string()),
            }
        }
        "more" | "m" => Command::More {
            anchor: rest.first().map(|s| s.to_string()),
        },
        "viewport" | "v" => {
            let raw = rest.first().context("viewport needs a height")?;
            let height = raw
                .parse()
                .with_context(|| format!("invalid viewport height {raw:?}"))?;
            Command::Viewport(height)
        }
        "list" | "l" => Command::List,
        "status" | "s" => Command::Status,
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => bail!("unknown command {other:?}, try `help`"),
    };
    Ok(Some(command))
}
